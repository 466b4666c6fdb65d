use crate::cart::{CartView, Phase};
use crate::classifier::Payload;
use crate::models::{Message, Product, Role};
use crate::saved::SavedItems;
use console::style;

fn terminal_width() -> usize {
    let term = console::Term::stdout();
    let width = term.size().1 as usize;
    std::cmp::min(width.saturating_sub(4), 100).max(50)
}

pub fn format_price(price: f64) -> String {
    format!("${:.2}", price)
}

/// Wraps `text` at spaces so no line is wider than `max_width` columns.
pub fn wrap_text(text: &str, max_width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    for raw_line in text.lines() {
        let mut current = String::new();
        for word in raw_line.split(' ') {
            let word_width = console::measure_text_width(word);
            let current_width = console::measure_text_width(&current);
            if !current.is_empty() && current_width + 1 + word_width > max_width {
                lines.push(std::mem::take(&mut current));
            }
            if word_width > max_width {
                let mut chunk = String::new();
                for ch in word.chars() {
                    if console::measure_text_width(&chunk) + 1 > max_width {
                        lines.push(std::mem::take(&mut chunk));
                    }
                    chunk.push(ch);
                }
                current = chunk;
                continue;
            }
            if !current.is_empty() {
                current.push(' ');
            }
            current.push_str(word);
        }
        lines.push(current);
    }
    lines
}

fn looks_like_markdown(text: &str) -> bool {
    text.contains("```") || text.contains("**") || text.contains('`') || text.contains("# ")
}

/// Boxed rendering of a text turn.
fn render_text_box(label: &str, text: &str, width: usize) -> String {
    let inner = width.saturating_sub(4);
    let wrapped = wrap_text(text, inner);
    let content_width = wrapped
        .iter()
        .map(|l| console::measure_text_width(l))
        .max()
        .unwrap_or(0);
    let box_width = std::cmp::min(width, content_width + 4).max(label.len() + 6);

    let mut out = Vec::new();
    out.push(
        style(format!(
            "┌─ {} {}┐",
            label,
            "─".repeat(box_width.saturating_sub(label.len() + 5))
        ))
        .dim()
        .blue()
        .to_string(),
    );
    for line in wrapped {
        let padding = box_width.saturating_sub(console::measure_text_width(&line) + 3);
        out.push(format!("│ {}{}│", line, " ".repeat(padding)));
    }
    out.push(
        style(format!("└{}┘", "─".repeat(box_width.saturating_sub(2))))
            .dim()
            .blue()
            .to_string(),
    );
    out.join("\n")
}

/// Numbered product cards; the number is what `/add` and `/save` take.
pub fn render_products(products: &[Product], saved: &SavedItems) -> String {
    let mut out = Vec::new();
    for (i, product) in products.iter().enumerate() {
        let marker = if saved.is_saved(&product.id) {
            style("♥").red().to_string()
        } else {
            style("♡").dim().to_string()
        };
        out.push(format!(
            "{:>3}. {} {}  {}  {}",
            style(i + 1).bold().cyan(),
            marker,
            style(&product.name).bold(),
            style(format_price(product.price)).green(),
            style(&product.category).dim(),
        ));
        if !product.description.is_empty() {
            out.push(format!("       {}", product.description));
        }
        if !product.tags.is_empty() {
            out.push(format!("       {}", style(product.tags.join(" · ")).dim()));
        }
    }
    out.join("\n")
}

pub fn render_message(message: &Message, saved: &SavedItems) -> String {
    let width = terminal_width();
    match message.payload() {
        Payload::Products(products) => format!(
            "{}\n{}",
            style("I found these items for you:").bold(),
            render_products(&products, saved)
        ),
        Payload::Text(text) => match message.role {
            Role::System => style(text).italic().dim().to_string(),
            _ => render_text_box(message.role.label(), &text, width),
        },
    }
}

/// Prints a turn; assistant prose that looks like markdown goes through
/// termimad instead of the box.
pub fn display_message(message: &Message, saved: &SavedItems) {
    if message.role == Role::Assistant {
        if let Payload::Text(text) = message.payload() {
            if looks_like_markdown(&text) {
                println!("\n{}", style(message.role.label()).bold().blue());
                termimad::print_text(&text);
                return;
            }
        }
    }
    println!("\n{}", render_message(message, saved));
}

pub fn render_bag(view: &CartView) -> String {
    let mut out = Vec::new();
    let syncing = match (view.phase, view.optimistic_pending) {
        (_, true) => " (updating…)",
        (Phase::Refreshing, false) => " (syncing…)",
        (Phase::Idle, false) => "",
    };
    out.push(format!(
        "{} {}{}",
        style("🛍  Your Bag").bold(),
        style(format!("[{}]", view.displayed_count)).bold().cyan(),
        style(syncing).dim()
    ));

    if view.items.is_empty() {
        out.push(style("Your bag is empty.").dim().to_string());
    } else {
        for (i, item) in view.items.iter().enumerate() {
            out.push(format!(
                "{:>3}. {}  {}  {}",
                i + 1,
                style(&item.name).bold(),
                style(&item.category).dim(),
                format_price(item.price)
            ));
        }
    }
    out.push(format!(
        "Subtotal: {}",
        style(format_price(view.subtotal())).bold()
    ));
    out.join("\n")
}

pub fn render_saved(saved: &SavedItems) -> String {
    if saved.is_empty() {
        return style("No saved looks yet. Use /save <n> on a listed item to save it!")
            .dim()
            .to_string();
    }
    let items: Vec<Product> = saved.items().cloned().collect();
    format!(
        "{}\n{}",
        style(format!("Saved Looks ({})", saved.len())).bold(),
        render_products(&items, saved)
    )
}

pub fn prompt(count: usize) -> String {
    format!("{} > ", style(format!("[bag {}]", count)).dim())
}

pub fn render_checkout_complete() -> String {
    format!(
        "{} {}",
        style("✓").bold().green(),
        style("Order placed successfully!").bold()
    )
}

pub fn display_error(message: &str) {
    eprintln!("{} {}", style("✗").bold().red(), style(message).red());
}
