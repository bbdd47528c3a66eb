// Copyright 2025 Google LLC
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     https://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use assert_matches::assert_matches;
use pretty_assertions::assert_eq;
use rstest::rstest;
use slumber::state::{Deadline, PowerState, PowerStateInfo};
use slumber::system::config::PmConfig;
use slumber::system::stats::StateStats;

use crate::sim::board::{IDLE_TICKS, Simulation, build_device};
use crate::sim::config::DeviceParam;
use crate::sim::{Error, SimArgs, parse_args, simulate};

const STANDBY: PowerStateInfo = PowerStateInfo::new(PowerState::Standby, 1000, 500);

fn device(name: &str) -> DeviceParam {
    DeviceParam {
        name: name.to_owned(),
        unmanaged: false,
        wakeup_capable: false,
        wakeup: false,
        busy: false,
        off: false,
        fail_suspend: None,
        fail_resume: None,
    }
}

#[test]
fn test_parse_args() {
    let args = SimArgs {
        pm: Some("cpus=2,tick_rate=0x3e8,stats=off".to_owned()),
        device: vec![
            "name=uart0,wakeup=on".to_owned(),
            "name=spi1,busy=true,off=on,fail_suspend=16".to_owned(),
        ],
        state: vec![
            "state=standby,min_residency_us=1000,exit_latency_us=500".to_owned(),
            "state=suspend-to-ram".to_owned(),
        ],
        ticks: Some(40),
        cycles: 3,
        force: Some("state=soft-off".to_owned()),
        cycles_per_tick: 100,
    };
    let config = parse_args(args).unwrap();
    assert_eq!(
        config.pm,
        PmConfig {
            cpus: 2,
            tick_rate: 1000,
            stats: false,
        }
    );
    assert_eq!(
        config.devices,
        [
            DeviceParam {
                wakeup: true,
                ..device("uart0")
            },
            DeviceParam {
                busy: true,
                off: true,
                fail_suspend: Some(16),
                ..device("spi1")
            },
        ]
    );
    assert_eq!(
        config.states,
        [
            STANDBY,
            PowerStateInfo::new(PowerState::SuspendToRam, 0, 0)
        ]
    );
    assert_eq!(config.deadline, Deadline::Ticks(40));
    assert_eq!(
        config.force,
        Some(PowerStateInfo::new(PowerState::SoftOff, 0, 0))
    );
}

#[test]
fn test_parse_args_defaults() {
    let config = parse_args(SimArgs::default()).unwrap();
    assert_eq!(config.pm, PmConfig::default());
    assert!(config.devices.is_empty());
    assert!(config.states.is_empty());
    assert_eq!(config.deadline, Deadline::Forever);
    assert_eq!(config.force, None);
}

#[rstest]
#[case::pm(SimArgs { pm: Some("cpus=many".to_owned()), ..Default::default() }, "cpus=many")]
#[case::state(SimArgs { state: vec!["state=hibernate".to_owned()], ..Default::default() }, "state=hibernate")]
#[case::force(SimArgs { force: Some("exit_latency_us=1".to_owned()), ..Default::default() }, "exit_latency_us=1")]
fn test_parse_args_error(#[case] args: SimArgs, #[case] bad: &str) {
    assert_matches!(parse_args(args), Err(Error::ParseArg { arg, .. }) if arg == bad);
}

#[test]
fn test_simulate_standby() {
    let args = SimArgs {
        device: vec!["name=a".to_owned(), "name=b,wakeup=on".to_owned()],
        state: vec!["state=standby,min_residency_us=1000,exit_latency_us=500".to_owned()],
        ticks: Some(20),
        cycles: 2,
        cycles_per_tick: 100,
        ..Default::default()
    };
    let report = simulate(args).unwrap();
    assert_eq!(report.entered, [PowerState::Standby, PowerState::Standby]);
    // 20 ticks minus 5 ticks of exit latency at 10 kHz.
    assert_eq!(
        report.stats,
        [(
            "pm_cpu_000_state_3_stats".to_owned(),
            StateStats {
                count: 2,
                last_cycles: 1500,
                total_cycles: 3000,
            }
        )]
    );
}

#[test]
fn test_simulate_round_robin() {
    let states = vec![
        PowerStateInfo::new(PowerState::RuntimeIdle, 0, 0),
        PowerStateInfo::ACTIVE,
        PowerStateInfo::new(PowerState::SuspendToIdle, 0, 0),
    ];
    let sim = Simulation::new(PmConfig::default(), states, &[device("a")], 10).unwrap();
    let report = sim.run(4, Deadline::Ticks(7), None);
    assert_eq!(
        report.entered,
        [
            PowerState::RuntimeIdle,
            PowerState::Active,
            PowerState::SuspendToIdle,
            PowerState::RuntimeIdle,
        ]
    );
    let names: Vec<_> = report.stats.iter().map(|(n, s)| (n.as_str(), s.count)).collect();
    assert_eq!(
        names,
        [
            ("pm_cpu_000_state_1_stats", 2),
            ("pm_cpu_000_state_2_stats", 1),
        ]
    );
    assert_eq!(sim.clock().irq_depth(), 0);
    assert_eq!(sim.clock().sched_depth(), 0);
}

#[test]
fn test_simulate_device_failure() {
    let devices = [
        device("a"),
        DeviceParam {
            fail_suspend: Some(16),
            ..device("b")
        },
        device("c"),
    ];
    let sim = Simulation::new(PmConfig::default(), vec![STANDBY], &devices, 100).unwrap();
    let report = sim.run(2, Deadline::Ticks(20), None);
    assert_eq!(report.entered, [PowerState::Active, PowerState::Active]);
    assert!(report.stats.is_empty());
    assert_eq!(sim.clock().irq_depth(), 0);
    assert_eq!(sim.clock().sched_depth(), 0);
}

#[test]
fn test_simulate_skips_busy_and_unmanaged() {
    let devices = [
        DeviceParam {
            busy: true,
            fail_suspend: Some(16),
            ..device("busy")
        },
        DeviceParam {
            unmanaged: true,
            ..device("bare")
        },
        DeviceParam {
            wakeup: true,
            fail_suspend: Some(5),
            ..device("wake")
        },
    ];
    let sim = Simulation::new(PmConfig::default(), vec![STANDBY], &devices, 100).unwrap();
    let report = sim.run(1, Deadline::Ticks(20), None);
    assert_eq!(report.entered, [PowerState::Standby]);
}

#[test]
fn test_simulate_forever() {
    let sim = Simulation::new(PmConfig::default(), vec![STANDBY], &[], 2).unwrap();
    let report = sim.run(1, Deadline::Forever, None);
    assert_eq!(report.stats.len(), 1);
    assert_eq!(report.stats[0].1.last_cycles, IDLE_TICKS * 2);
}

#[test]
fn test_simulate_force() {
    let config = PmConfig {
        stats: false,
        ..Default::default()
    };
    let sim = Simulation::new(config, vec![], &[device("a")], 1).unwrap();
    let force = PowerStateInfo::new(PowerState::SoftOff, 0, 0);
    let report = sim.run(2, Deadline::Forever, Some(force));
    assert_eq!(report.entered, [PowerState::Active, PowerState::Active]);
    assert!(report.stats.is_empty());
    assert_eq!(sim.clock().irq_depth(), 0);
    assert_eq!(sim.clock().sched_depth(), 0);
}

#[test]
fn test_simulate_skips_off_device() {
    let devices = [
        DeviceParam {
            off: true,
            fail_suspend: Some(16),
            ..device("dma")
        },
        device("uart"),
    ];
    let sim = Simulation::new(PmConfig::default(), vec![STANDBY], &devices, 100).unwrap();
    let report = sim.run(1, Deadline::Ticks(20), None);
    assert_eq!(report.entered, [PowerState::Standby]);
}

#[test]
fn test_turn_off_unmanaged_device() {
    let param = DeviceParam {
        unmanaged: true,
        off: true,
        ..device("bare")
    };
    let err = build_device(&param).unwrap_err();
    assert_matches!(&err, Error::TurnOff { name, .. } if name == "bare");

    let trace = format!("{err:?}");
    let lines: Vec<_> = trace.lines().collect();
    assert_eq!(lines.len(), 3);
    assert_eq!(lines[0], "Failed to turn off bare");
    assert!(lines[1].starts_with("0: Device power management is not supported, at "));
    assert!(lines[2].starts_with("1: Failed to turn off bare, at "));

    let devices = [device("a"), param];
    let sim = Simulation::new(PmConfig::default(), vec![STANDBY], &devices, 1);
    assert_matches!(sim.err(), Some(Error::TurnOff { .. }));
}
