// Common test utilities
#![allow(dead_code)]

use vtrewrite::config::{Config, ViolationPolicy};
use vtrewrite::sim::{format_stack, parse_into_stack, parse_into_vars, OperandStack, VarMap};

pub fn init_logger() {
    let _ = env_logger::builder()
        .is_test(true)
        .format_timestamp_millis()
        .filter_level(log::LevelFilter::Debug)
        .try_init();
}

/// Config that logs everything the simulators emit
pub fn test_config() -> Config {
    Config::default().with_log_level(log::LevelFilter::Trace)
}

pub fn recording_config() -> Config {
    test_config().with_violation_policy(ViolationPolicy::Record)
}

/// Build a stack from notation, e.g. "3 2X 1"
pub fn stack_of(notation: &str) -> OperandStack {
    init_logger();
    let mut stack = OperandStack::new("Test.run()V", &test_config());
    parse_into_stack(notation, &mut stack).expect("valid notation");
    stack
}

pub fn vars_of(notation: &str) -> VarMap {
    init_logger();
    let mut vars = VarMap::new("Test.run()V", &test_config());
    parse_into_vars(notation, &mut vars).expect("valid notation");
    vars
}

pub fn render(stack: &OperandStack) -> String {
    format_stack(stack)
}
