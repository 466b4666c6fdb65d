use crate::cart::{CartView, RefreshOutcome};
use crate::cli::Args;
use crate::commands::CommandDispatcher;
use crate::core::error::ShopError;
use crate::display;
use crate::input::InputReader;
use crate::session::Session;
use console::style;
use is_terminal::IsTerminal;

pub struct Application {
    pub args: Args,
    pub session: Session,
    pub command_dispatcher: CommandDispatcher,
    last_bag: Option<CartView>,
}

impl Application {
    pub fn new(args: Args, session: Session, command_dispatcher: CommandDispatcher) -> Self {
        Self {
            args,
            session,
            command_dispatcher,
            last_bag: None,
        }
    }

    pub async fn run(&mut self) -> Result<(), ShopError> {
        if self.session.mount().await == RefreshOutcome::Failed {
            display::display_error("Could not reach the store; your bag will sync once it is back.");
        }

        let interactive = std::io::stdin().is_terminal();
        if interactive {
            println!(
                "{}",
                style("Type /help for commands. Press Ctrl+D or type /quit to leave.").dim()
            );
        }
        if let Some(first) = self.session.conversation.last() {
            display::display_message(first, &self.session.saved);
        }

        if let Some(query) = self.args.query.clone() {
            self.send_chat(&query).await;
        }

        let mut input =
            InputReader::spawn(self.command_dispatcher.get_command_names(), interactive);

        while self.session.should_continue {
            self.report_settled().await;
            self.render_open_bag();

            let prompt = display::prompt(self.session.cart.displayed_count());
            let line = match input.read_line(prompt).await? {
                Some(line) => line,
                None => break,
            };
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            match self.command_dispatcher.execute_line(line, &mut self.session) {
                Some(Ok(Some(output))) => {
                    println!("{}", output);
                    // `/bag` just printed it.
                    if self.session.cart_open && self.last_bag.is_none() {
                        self.last_bag = Some(self.session.cart.view());
                    }
                }
                Some(Ok(None)) => {}
                Some(Err(e)) => display::display_error(&e.to_string()),
                None => self.send_chat(line).await,
            }
        }

        for e in self.session.settle_all().await {
            display::display_error(&e.to_string());
        }
        println!("Goodbye!");
        Ok(())
    }

    async fn send_chat(&mut self, text: &str) {
        let waiting = style("Browsing catalog...").dim();
        println!("{}", waiting);
        match self.session.send_message(text).await {
            Ok(reply) => display::display_message(&reply, &self.session.saved),
            Err(e) => display::display_error(&e.to_string()),
        }
    }

    async fn report_settled(&mut self) {
        for e in self.session.reap_settled().await {
            display::display_error(&format!("Bag update failed: {}", e));
        }
    }

    /// Re-renders the bag while it is open, but only when it changed.
    fn render_open_bag(&mut self) {
        if !self.session.cart_open {
            self.last_bag = None;
            return;
        }
        let view = self.session.cart.view();
        if self.last_bag.as_ref() != Some(&view) {
            println!("{}", display::render_bag(&view));
            self.last_bag = Some(view);
        }
    }
}
