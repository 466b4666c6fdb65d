use crate::commands::handler::CommandHandler;
use crate::core::error::ShopError;
use crate::session::Session;
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Default)]
pub struct CommandRegistry {
    handlers: HashMap<String, Arc<dyn CommandHandler + Send + Sync>>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<C: CommandHandler + Send + Sync + 'static>(&mut self, name: &str, command: C) {
        self.handlers.insert(name.to_string(), Arc::new(command));
    }

    pub fn execute(
        &self,
        name: &str,
        args: &[&str],
        session: &mut Session,
    ) -> Result<Option<String>, ShopError> {
        self.handlers
            .get(name)
            .ok_or_else(|| ShopError::Input(format!("Unknown command: /{}", name)))
            .and_then(|handler| handler.execute(session, args))
    }

    pub fn get_command_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.handlers.keys().cloned().collect();
        names.sort();
        names
    }
}
