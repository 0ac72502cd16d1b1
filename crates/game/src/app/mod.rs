pub(crate) mod bootstrap;
pub(crate) mod level;
pub(crate) mod loop_runner;
pub(crate) mod paths;
