use crate::core::error::ShopError;
use crate::display;
use crate::session::Session;

use console::style;

pub trait CommandHandler {
    fn execute(&self, session: &mut Session, args: &[&str]) -> Result<Option<String>, ShopError>;
    fn help(&self) -> &'static str;
}

pub struct QuitCommand;
pub struct HelpCommand;
pub struct AddCommand;
pub struct RemoveCommand;
pub struct SaveCommand;
pub struct SavedCommand;
pub struct BagCommand;
pub struct CloseCommand;
pub struct CheckoutCommand;

fn parse_index(args: &[&str], usage: &str) -> Result<usize, ShopError> {
    args.first()
        .and_then(|arg| arg.parse::<usize>().ok())
        .ok_or_else(|| ShopError::Input(format!("Usage: {}", usage)))
}

impl CommandHandler for QuitCommand {
    fn execute(&self, session: &mut Session, _args: &[&str]) -> Result<Option<String>, ShopError> {
        session.should_continue = false;
        Ok(None)
    }

    fn help(&self) -> &'static str {
        "/quit - Leave the shop"
    }
}

impl CommandHandler for HelpCommand {
    fn execute(
        &self,
        _session: &mut Session,
        _args: &[&str],
    ) -> Result<Option<String>, ShopError> {
        let title = style("Available Commands").bold().underlined();
        let help_text = [
            title.to_string(),
            AddCommand.help().to_string(),
            RemoveCommand.help().to_string(),
            SaveCommand.help().to_string(),
            SavedCommand.help().to_string(),
            BagCommand.help().to_string(),
            CloseCommand.help().to_string(),
            CheckoutCommand.help().to_string(),
            HelpCommand.help().to_string(),
            QuitCommand.help().to_string(),
            style("Anything else is sent to your personal shopper.")
                .dim()
                .to_string(),
        ]
        .join("\n");

        Ok(Some(help_text))
    }

    fn help(&self) -> &'static str {
        "/help - Show available commands"
    }
}

impl CommandHandler for AddCommand {
    fn execute(&self, session: &mut Session, args: &[&str]) -> Result<Option<String>, ShopError> {
        let n = parse_index(args, self.help())?;
        let product = session.listed_product(n)?;
        let count = session.add_to_cart(&product)?;
        Ok(Some(format!(
            "Added {} to your bag ({} item{}).",
            style(&product.name).bold(),
            count,
            if count == 1 { "" } else { "s" }
        )))
    }

    fn help(&self) -> &'static str {
        "/add <n> - Add product n from the latest listing to your bag"
    }
}

impl CommandHandler for RemoveCommand {
    fn execute(&self, session: &mut Session, args: &[&str]) -> Result<Option<String>, ShopError> {
        let reference = args
            .first()
            .ok_or_else(|| ShopError::Input(format!("Usage: {}", self.help())))?;
        let product = session.resolve_bag_item(reference)?;
        session.remove_from_cart(&product.id);
        Ok(Some(format!(
            "Removing {} from your bag…",
            style(&product.name).bold()
        )))
    }

    fn help(&self) -> &'static str {
        "/remove <n|id> - Remove an item from your bag by position or product id"
    }
}

impl CommandHandler for SaveCommand {
    fn execute(&self, session: &mut Session, args: &[&str]) -> Result<Option<String>, ShopError> {
        let n = parse_index(args, self.help())?;
        let product = session.listed_product(n)?;
        let message = if session.toggle_saved(&product) {
            format!("Saved {}.", style(&product.name).bold())
        } else {
            format!("Removed {} from saved looks.", style(&product.name).bold())
        };
        Ok(Some(message))
    }

    fn help(&self) -> &'static str {
        "/save <n> - Save or unsave product n from the latest listing"
    }
}

impl CommandHandler for SavedCommand {
    fn execute(&self, session: &mut Session, _args: &[&str]) -> Result<Option<String>, ShopError> {
        Ok(Some(display::render_saved(&session.saved)))
    }

    fn help(&self) -> &'static str {
        "/saved - Show your saved looks"
    }
}

impl CommandHandler for BagCommand {
    fn execute(&self, session: &mut Session, _args: &[&str]) -> Result<Option<String>, ShopError> {
        session.cart_open = true;
        Ok(Some(display::render_bag(&session.cart.view())))
    }

    fn help(&self) -> &'static str {
        "/bag - Open your bag (it stays open and updates until /close)"
    }
}

impl CommandHandler for CloseCommand {
    fn execute(&self, session: &mut Session, _args: &[&str]) -> Result<Option<String>, ShopError> {
        session.cart_open = false;
        Ok(None)
    }

    fn help(&self) -> &'static str {
        "/close - Close your bag"
    }
}

impl CommandHandler for CheckoutCommand {
    fn execute(&self, session: &mut Session, _args: &[&str]) -> Result<Option<String>, ShopError> {
        session.checkout()?;
        Ok(Some(display::render_checkout_complete()))
    }

    fn help(&self) -> &'static str {
        "/checkout - Place your order and start over"
    }
}
