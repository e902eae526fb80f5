use colored::Colorize;

use taxsync_application::{Notification, NotificationLevel};
use taxsync_core::model::{Collection, TaxResult};
use taxsync_core::render::{CollectionView, SessionView, render_result};

fn heading(collection: Collection) -> &'static str {
    match collection {
        Collection::Jobs => "Jobs",
        Collection::Deductions => "Deductions",
        Collection::RefundableCredits => "Refundable credits",
        Collection::NonRefundableCredits => "Non-refundable credits",
    }
}

pub fn print_view(view: &SessionView) {
    println!(
        "{} {}",
        "Filing status:".bright_magenta().bold(),
        view.status.label
    );
    if !view.status.options.is_empty() {
        let options: Vec<String> = view
            .status
            .options
            .iter()
            .map(|option| {
                let text = format!("[{}] {}", option.code, option.label);
                if option.active {
                    text.bright_green().bold().to_string()
                } else {
                    text.bright_black().to_string()
                }
            })
            .collect();
        println!("  {}", options.join("  "));
    }

    for collection in view.collections() {
        print_collection(collection);
    }

    if view.show_add_standard_deduction {
        println!();
        println!(
            "{}",
            "Tip: run 'add-standard-deduction' to add the standard deduction for your filing status."
                .yellow()
        );
    }
}

fn print_collection(view: &CollectionView) {
    println!();
    println!("{}", heading(view.collection).bright_magenta().bold());
    if view.is_empty() {
        println!("  {}", view.empty_message().bright_black());
        return;
    }
    for item in &view.items {
        println!(
            "  {} {}  {}",
            format!("{}.", item.index).bright_black(),
            item.description,
            item.detail.bright_blue()
        );
    }
}

pub fn print_result(result: &TaxResult) {
    println!("{}", "Tax estimate".bright_magenta().bold());
    let lines = render_result(result);
    let width = lines.iter().map(|(label, _)| label.len()).max().unwrap_or(0);
    for (label, value) in lines {
        let line = format!("  {:<width$}  {:>16}", label, value, width = width);
        if label == "Total tax" {
            println!("{}", line.bold());
        } else {
            println!("{}", line);
        }
    }
}

pub fn print_notifications(notifications: &[Notification]) {
    for notification in notifications {
        let stamp = notification.created_at.format("%H:%M:%S").to_string();
        let message = match notification.level {
            NotificationLevel::Success => notification.message.bright_green(),
            NotificationLevel::Error => notification.message.red(),
        };
        println!("{} {}", stamp.bright_black(), message);
    }
}
