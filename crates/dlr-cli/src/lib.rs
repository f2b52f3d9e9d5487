pub mod cli;
pub mod common;

pub use cli::{
    BaseCaseArgs, Cli, Commands, CriticalTempArgs, GridCommands, ReportArgs, ScreenArgs, SweepArgs,
};
