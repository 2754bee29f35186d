// src/main.rs
// Demo entry point: drives the simulated base to a goal with the configured
// drive strategy, polling the way a navigation skill does.
//
// Usage: roboskills [config.yaml] [x y yaw]

use std::error::Error;
use std::sync::Arc;
use std::time::Duration;

use log::{info, warn};
use roboskills::interface::sim::SimSettings;
use roboskills::{
    DriveConfig, NavigationGoal, Pose2D, SimulatedBase, StrategyState, build_strategy,
    drive_to_completion,
};

const MAX_CYCLES: usize = 400;

/// Parses `[config.yaml] [x y yaw]` from the command line
fn parse_args(args: &[String]) -> Result<(DriveConfig, NavigationGoal), Box<dyn Error>> {
    let (config, rest) = match args.first() {
        Some(path) if path.parse::<f64>().is_err() => (DriveConfig::from_yaml_file(path)?, &args[1..]),
        _ => (DriveConfig::default(), args),
    };

    let goal = match rest {
        [] => NavigationGoal::global(3.0, 1.5, 1.57),
        [x, y, yaw] => NavigationGoal::global(x.parse()?, y.parse()?, yaw.parse()?),
        _ => return Err("expected goal as three numbers: x y yaw".into()),
    };

    Ok((config, goal))
}

fn main() -> Result<(), Box<dyn Error>> {
    // Initialize logging for debugging
    env_logger::init();
    info!("Starting roboskills drive demo...");

    let args: Vec<String> = std::env::args().skip(1).collect();
    let (config, goal) = parse_args(&args)?;
    info!("Strategy {:?}, goal ({}, {}, {})", config.strategy, goal.x, goal.y, goal.yaw);

    // The simulated base covers 90% of each command so the chaser has to replan
    let base = SimulatedBase::with_settings(
        Pose2D::default(),
        SimSettings {
            latency: Duration::from_millis(150),
            reach_ratio: 0.9,
            ..SimSettings::default()
        },
    );
    let mut strategy = build_strategy(&config, Arc::new(base.clone()), Arc::new(base.clone()));

    let state = drive_to_completion(strategy.as_mut(), goal, config.poll_period(), MAX_CYCLES);

    let pose = base.pose();
    info!(
        "Finished with {} at ({:.3}, {:.3}, {:.3}) after {} commands",
        state,
        pose.x,
        pose.y,
        pose.yaw,
        base.commands().len()
    );
    if state != StrategyState::Success {
        warn!("Drive attempt did not succeed");
    }

    Ok(())
}
