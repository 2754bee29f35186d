// Integration tests: drive strategies against the simulated base

use std::sync::Arc;
use std::time::Duration;

use roboskills::core::distance;
use roboskills::interface::sim::{CommandKind, SimSettings};
use roboskills::navigation::{GoalPolicy, NearestToTarget, PlanContext};
use roboskills::{
    DispatchMode, DriveConfig, DriveStrategy, Frame, NavResult, NavigationGoal, NoStrategy,
    Pose2D, PositionSensor, RetryingGoalChaser, SimulatedBase, StrategyKind, StrategyState,
    build_strategy, drive_to_completion,
};
use rstest::{fixture, rstest};

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

#[fixture]
fn origin_base() -> SimulatedBase {
    init_logging();
    SimulatedBase::new(Pose2D::default())
}

fn chaser(base: &SimulatedBase, config: DriveConfig) -> RetryingGoalChaser<NearestToTarget> {
    RetryingGoalChaser::new(
        Arc::new(base.clone()),
        Arc::new(base.clone()),
        config,
        NearestToTarget,
    )
}

#[test]
fn robot_already_within_tolerance_succeeds_on_first_cycle() {
    init_logging();
    let base = SimulatedBase::new(Pose2D::new(1.9, 0.0, 0.0));
    let mut strategy = chaser(&base, DriveConfig::default());

    assert!(strategy.init(NavigationGoal::global(2.0, 0.0, 0.0)));
    assert_eq!(strategy.execute(), StrategyState::Success);
    assert!(base.commands().is_empty());
}

#[rstest]
fn local_goal_is_rewritten_to_map_frame(origin_base: SimulatedBase) {
    let mut strategy = chaser(&origin_base, DriveConfig::default());

    assert!(strategy.init(NavigationGoal::local(1.0, 0.0, 0.0)));
    let target = strategy.target_goal().unwrap();
    assert_eq!(target.frame, Frame::Global);
    assert!((target.x - 1.0).abs() < 1e-9);
    assert!(target.y.abs() < 1e-9);
    assert!(target.yaw.abs() < 1e-9);
    assert_eq!(target.tolerance, 0.2);
}

#[rstest]
fn global_goal_coordinates_survive_init(origin_base: SimulatedBase) {
    let mut strategy = chaser(&origin_base, DriveConfig::default());
    let goal = NavigationGoal::global(-4.0, 2.5, 2.0);

    assert!(strategy.init(goal));
    let target = strategy.target_goal().unwrap();
    assert_eq!((target.x, target.y, target.yaw), (goal.x, goal.y, goal.yaw));
    assert_eq!(origin_base.costmap_clears(), 1);
}

#[rstest]
fn plan_is_walked_back_one_waypoint_per_attempt(origin_base: SimulatedBase) {
    let config = DriveConfig::default();
    let robot = origin_base.read_last(config.pose_timeout()).unwrap();
    // 1.25 m at 0.25 m spacing: five waypoints
    let target = NavigationGoal::global(1.25, 0.0, 0.5);
    let mut policy = NearestToTarget;

    let mut pick = |take_goal| {
        let ctx = PlanContext {
            actuator: &origin_base,
            robot: &robot,
            target: &target,
            take_goal,
            config: &config,
        };
        policy.find_best_goal(&ctx).unwrap()
    };

    let first = pick(1).unwrap();
    assert!((first.x - 1.25).abs() < 1e-9);
    let second = pick(2).unwrap();
    assert!((second.x - 1.0).abs() < 1e-9);
    assert_eq!(second.yaw, 0.5);
    assert_eq!(pick(3), None);
}

#[rstest]
fn blocked_path_is_reported_as_such(origin_base: SimulatedBase) {
    origin_base.script_results([NavResult::PathBlocked]);
    let mut strategy = chaser(&origin_base, DriveConfig::default());

    assert!(strategy.init(NavigationGoal::global(3.0, 0.0, 0.0)));
    assert_eq!(strategy.execute(), StrategyState::NotFinished);
    assert_eq!(strategy.execute(), StrategyState::PathBlocked);
    assert_eq!(origin_base.commands().len(), 1);
}

#[rstest]
fn lost_localization_is_an_error(origin_base: SimulatedBase) {
    let mut strategy = chaser(&origin_base, DriveConfig::default());
    assert!(strategy.init(NavigationGoal::global(3.0, 0.0, 0.0)));

    origin_base.set_pose_available(false);
    assert_eq!(strategy.execute(), StrategyState::Error);
    assert!(origin_base.commands().is_empty());
}

#[rstest]
fn local_goal_without_localization_is_rejected(origin_base: SimulatedBase) {
    origin_base.set_pose_available(false);
    let mut strategy = chaser(&origin_base, DriveConfig::default());
    assert!(!strategy.init(NavigationGoal::local(1.0, 0.0, 0.0)));
    assert_eq!(strategy.execute(), StrategyState::Error);
}

#[test]
fn chases_target_through_replanning_with_slow_commands() {
    init_logging();
    let base = SimulatedBase::with_settings(
        Pose2D::default(),
        SimSettings {
            latency: Duration::from_millis(20),
            reach_ratio: 0.9,
            ..SimSettings::default()
        },
    );
    let config = DriveConfig::default();
    let mut strategy = chaser(&base, config.clone());
    let target = NavigationGoal::global(3.0, 1.5, 1.57);

    assert!(strategy.init(target));
    let mut take_goal = strategy.take_goal();
    let mut issued = 0;
    let mut state = StrategyState::NotFinished;
    for _ in 0..500 {
        state = strategy.execute();

        // never more than one command in flight, never a step backwards
        let now_issued = base.commands().len();
        assert!(now_issued <= issued + 1);
        issued = now_issued;
        assert!(strategy.take_goal() >= take_goal);
        take_goal = strategy.take_goal();

        if state.is_terminal() {
            break;
        }
        std::thread::sleep(Duration::from_millis(2));
    }

    assert_eq!(state, StrategyState::Success);
    assert!(issued >= 2, "expected at least one replan, got {} commands", issued);
    let last = strategy.last_pose().unwrap();
    assert!(distance(&last.pose, &target.pose()) < config.max_distance_success);
    assert!(base.commands().iter().all(|c| c.kind == CommandKind::Coordinate));
}

#[test]
fn final_yaw_is_corrected_in_place() {
    init_logging();
    let base = SimulatedBase::new(Pose2D::new(2.0, 0.0, 0.0));
    let mut strategy = chaser(&base, DriveConfig::default());

    let state = drive_to_completion(
        &mut strategy,
        NavigationGoal::global(2.0, 0.0, -1.0),
        Duration::from_millis(1),
        20,
    );

    assert_eq!(state, StrategyState::Success);
    let commands = base.commands();
    assert_eq!(commands.len(), 1);
    assert_eq!(commands[0].kind, CommandKind::Relative);
    assert!((commands[0].goal.yaw + 1.0).abs() < 1e-9);
    assert!((base.pose().yaw + 1.0).abs() < 1e-9);
}

#[test]
fn unsupported_async_planning_falls_back_to_try_goal() {
    init_logging();
    let base = SimulatedBase::with_settings(
        Pose2D::default(),
        SimSettings {
            async_planning: false,
            ..SimSettings::default()
        },
    );
    let mut strategy = chaser(&base, DriveConfig::default());

    let state = drive_to_completion(
        &mut strategy,
        NavigationGoal::global(1.0, 1.0, 0.0),
        Duration::from_millis(1),
        20,
    );
    assert_eq!(state, StrategyState::Success);
    assert!(base.plan_requests() >= 1);
}

#[test]
fn interrupt_dispatch_uses_preempting_command() {
    init_logging();
    let base = SimulatedBase::new(Pose2D::default());
    let config = DriveConfig {
        dispatch: DispatchMode::Interrupt,
        ..DriveConfig::default()
    };
    let mut strategy = chaser(&base, config);

    let state = drive_to_completion(
        &mut strategy,
        NavigationGoal::global(1.0, 0.0, 0.0),
        Duration::from_millis(1),
        20,
    );
    assert_eq!(state, StrategyState::Success);
    assert_eq!(base.commands()[0].kind, CommandKind::Interrupt);
}

#[rstest]
#[case(NavResult::Success, StrategyState::Success)]
#[case(NavResult::PathBlocked, StrategyState::ReachedPartly)]
#[case(NavResult::EmergencyStopped, StrategyState::Error)]
fn direct_strategy_reports_single_outcome(
    origin_base: SimulatedBase,
    #[case] result: NavResult,
    #[case] expected: StrategyState,
) {
    origin_base.script_results([result]);
    let mut strategy = NoStrategy::new(
        Arc::new(origin_base.clone()),
        Arc::new(origin_base.clone()),
        DriveConfig::default(),
    );

    let state = drive_to_completion(
        &mut strategy,
        NavigationGoal::global(2.0, 0.0, 0.0),
        Duration::from_millis(1),
        20,
    );
    assert_eq!(state, expected);
    assert_eq!(origin_base.commands().len(), 1);
    assert_eq!(origin_base.costmap_clears(), 0);
    assert_eq!(origin_base.plan_requests(), 0);
}

#[test]
fn giving_up_stops_the_base() {
    init_logging();
    let base = SimulatedBase::with_settings(
        Pose2D::default(),
        SimSettings {
            latency: Duration::from_secs(5),
            ..SimSettings::default()
        },
    );
    let config = DriveConfig {
        strategy: StrategyKind::NoStrategy,
        ..DriveConfig::default()
    };
    let mut strategy = build_strategy(&config, Arc::new(base.clone()), Arc::new(base.clone()));

    let state = drive_to_completion(
        strategy.as_mut(),
        NavigationGoal::global(2.0, 0.0, 0.0),
        Duration::from_millis(1),
        5,
    );
    assert_eq!(state, StrategyState::Error);
    assert_eq!(base.stop_count(), 1);
}

#[test]
fn shipped_configuration_loads() {
    let path = concat!(env!("CARGO_MANIFEST_DIR"), "/config/drive.yaml");
    let config = DriveConfig::from_yaml_file(path).unwrap();
    assert_eq!(config, DriveConfig::default());
}
