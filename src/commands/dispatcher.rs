use super::{
    handler::{
        AddCommand, BagCommand, CheckoutCommand, CloseCommand, HelpCommand, QuitCommand,
        RemoveCommand, SaveCommand, SavedCommand,
    },
    registry::CommandRegistry,
};
use crate::core::error::ShopError;
use crate::session::Session;
use std::sync::Arc;

#[derive(Clone)]
pub struct CommandDispatcher {
    registry: Arc<CommandRegistry>,
}

impl CommandDispatcher {
    pub fn new(registry: Arc<CommandRegistry>) -> Self {
        Self { registry }
    }

    pub fn execute(
        &self,
        command: &str,
        args: &[&str],
        session: &mut Session,
    ) -> Result<Option<String>, ShopError> {
        self.registry.execute(command, args, session)
    }

    /// Runs a `/command arg...` line. Returns `None` for anything that is
    /// not a slash command.
    pub fn execute_line(
        &self,
        line: &str,
        session: &mut Session,
    ) -> Option<Result<Option<String>, ShopError>> {
        let rest = line.trim().strip_prefix('/')?;
        let parts: Vec<&str> = rest.split_whitespace().collect();
        let (command, args) = parts.split_first()?;
        Some(self.execute(command, args, session))
    }

    pub fn get_command_names(&self) -> Vec<String> {
        self.registry.get_command_names()
    }
}

pub fn create_command_registry() -> CommandDispatcher {
    let mut registry = CommandRegistry::new();

    registry.register("quit", QuitCommand);
    registry.register("help", HelpCommand);
    registry.register("add", AddCommand);
    registry.register("remove", RemoveCommand);
    registry.register("save", SaveCommand);
    registry.register("saved", SavedCommand);
    registry.register("bag", BagCommand);
    registry.register("cart", BagCommand);
    registry.register("close", CloseCommand);
    registry.register("checkout", CheckoutCommand);

    CommandDispatcher::new(Arc::new(registry))
}
