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

pub mod board;
pub mod config;

#[cfg(test)]
#[path = "sim_test.rs"]
mod tests;

use clap::Args;
use serde::de::DeserializeOwned;
use serde_aco::help_text;
use slumber::errors::{DebugTrace, trace_error};
use slumber::state::{Deadline, PowerStateInfo};
use slumber::system::config::PmConfig;
use snafu::{ResultExt, Snafu};

use self::board::{Report, Simulation};
use self::config::DeviceParam;

#[trace_error]
#[derive(Snafu, DebugTrace)]
#[snafu(module, context(suffix(false)))]
pub enum Error {
    #[snafu(display("Failed to parse {arg}"))]
    ParseArg {
        arg: String,
        error: serde_aco::Error,
    },
    #[snafu(display("Failed to turn off {name}"))]
    TurnOff {
        name: String,
        source: Box<slumber::device::Error>,
    },
}

type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Args, Debug, Clone, Default)]
pub struct SimArgs {
    #[arg(long, help(
        help_text::<PmConfig>("Configure the power manager.")
    ), value_name = "CONFIG")]
    pm: Option<String>,

    #[arg(long, help(
        help_text::<DeviceParam>("Add a device, in registration order.")
    ), value_name = "DEVICE")]
    device: Vec<String>,

    #[arg(long, help(
        help_text::<PowerStateInfo>("Add a power state for the policy to pick in turn.")
    ), value_name = "STATE")]
    state: Vec<String>,

    /// Ticks until the next scheduled event. Sleep forever if not set.
    #[arg(long)]
    ticks: Option<u32>,

    /// Number of idle cycles to run.
    #[arg(long, default_value_t = 1)]
    cycles: u32,

    #[arg(long, help(
        help_text::<PowerStateInfo>("Force a power state after the idle cycles.")
    ), value_name = "STATE")]
    force: Option<String>,

    /// Cycle counter increments per tick.
    #[arg(long, default_value_t = 100)]
    cycles_per_tick: u32,
}

fn parse_arg<T: DeserializeOwned>(arg: String) -> Result<T> {
    serde_aco::from_arg(&arg).context(error::ParseArg { arg })
}

#[derive(Debug)]
pub struct SimConfig {
    pub pm: PmConfig,
    pub devices: Vec<DeviceParam>,
    pub states: Vec<PowerStateInfo>,
    pub deadline: Deadline,
    pub force: Option<PowerStateInfo>,
}

pub fn parse_args(args: SimArgs) -> Result<SimConfig> {
    let pm = match args.pm {
        Some(arg) => parse_arg(arg)?,
        None => PmConfig::default(),
    };
    let devices = args
        .device
        .into_iter()
        .map(parse_arg)
        .collect::<Result<Vec<_>>>()?;
    let states = args
        .state
        .into_iter()
        .map(parse_arg)
        .collect::<Result<Vec<_>>>()?;
    let force = args.force.map(parse_arg).transpose()?;
    let deadline = match args.ticks {
        Some(ticks) => Deadline::Ticks(ticks),
        None => Deadline::Forever,
    };
    Ok(SimConfig {
        pm,
        devices,
        states,
        deadline,
        force,
    })
}

pub fn simulate(args: SimArgs) -> Result<Report> {
    let cycles = args.cycles;
    let cycles_per_tick = args.cycles_per_tick;
    let config = parse_args(args)?;
    let sim = Simulation::new(config.pm, config.states, &config.devices, cycles_per_tick)?;
    Ok(sim.run(cycles, config.deadline, config.force))
}

pub fn sim(args: SimArgs) -> Result<()> {
    let report = simulate(args)?;
    for (cycle, state) in report.entered.iter().enumerate() {
        println!("cycle {cycle}: {state}");
    }
    for (name, stats) in report.stats {
        println!(
            "{name}: count={} last_cycles={} total_cycles={}",
            stats.count, stats.last_cycles, stats.total_cycles
        );
    }
    Ok(())
}
