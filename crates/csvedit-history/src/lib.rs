pub mod command;
pub mod stack;

pub use command::{AddRowCommand, Change, Command, CommandBox, DeleteRowCommand, SetCellCommand};
pub use stack::HistoryManager;
