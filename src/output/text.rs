use crate::engine::status::Resolution;
use crate::engine::sweep::{ArchiveReport, ArchivedTask, GenerationReport, ShiftReport, UnitErrors};
use crate::engine::time::{date_to_storage, time_to_storage, BusinessClock};
use crate::models::{Dealership, Generator, Response, Setting, Shift, Task, User};

fn short(id: &str) -> &str {
    &id[..std::cmp::min(8, id.len())]
}

fn active_marker(is_active: bool) -> &'static str {
    if is_active {
        ""
    } else {
        " (inactive)"
    }
}

pub fn print_dealership_list(dealerships: &[Dealership]) {
    if dealerships.is_empty() {
        println!("No dealerships found.");
        return;
    }
    for d in dealerships {
        println!("  {} ({}){}", d.name, d.id, active_marker(d.is_active));
    }
}

pub fn print_user_list(users: &[User]) {
    if users.is_empty() {
        println!("No users found.");
        return;
    }
    for u in users {
        println!("  {} ({}) @{}{}", u.name, u.id, short(&u.dealership_id), active_marker(u.is_active));
    }
}

pub fn print_generator(g: &Generator) {
    println!("Generator: {} ({})", g.title, g.id);
    if let Some(ref desc) = g.description {
        println!("  Description: {desc}");
    }
    println!("  Recurrence: {}", g.recurrence.as_str());
    if !g.days_of_week.is_empty() {
        println!("  Weekdays: {:?}", g.days_of_week);
    }
    if !g.days_of_month.is_empty() {
        println!("  Days of month: {:?}", g.days_of_month);
    }
    match g.deadline_time {
        Some(deadline) => println!(
            "  Appears: {}  Deadline: {}",
            time_to_storage(g.appear_time),
            time_to_storage(deadline)
        ),
        None => println!("  Appears: {}", time_to_storage(g.appear_time)),
    }
    match g.end_date {
        Some(end) => println!("  Valid: {} .. {}", date_to_storage(g.start_date), date_to_storage(end)),
        None => println!("  Valid from: {}", date_to_storage(g.start_date)),
    }
    println!("  Assignees: {}", g.assignees.join(", "));
    if let Some(cursor) = g.last_generated_at {
        println!("  Last generated: {}", date_to_storage(cursor));
    }
    if !g.is_active {
        println!("  Paused");
    }
}

pub fn print_generator_list(generators: &[Generator]) {
    if generators.is_empty() {
        println!("No generators found.");
        return;
    }
    for g in generators {
        println!(
            "  [{}] {} ({}) at {}{}",
            g.recurrence.as_str(),
            g.title,
            short(&g.id),
            time_to_storage(g.appear_time),
            if g.is_active { "" } else { " paused" }
        );
    }
}

pub fn print_task(t: &Task, resolution: &Resolution, responses: &[Response], clock: &BusinessClock) {
    println!("Task: {} ({})", t.title, t.id);
    if let Some(ref desc) = t.description {
        println!("  Description: {desc}");
    }
    println!("  Status: {}", resolution.status.as_str());
    println!("  Priority: {}", t.priority.as_str());
    println!("  Appears: {}", clock.display(t.appear_at));
    if let Some(deadline) = t.deadline_at {
        println!("  Deadline: {}", clock.display(deadline));
    }
    if let (Some(at), Some(reason)) = (t.archived_at, t.archive_reason) {
        println!("  Archived: {} ({})", clock.display(at), reason.as_str());
    }
    for r in responses {
        println!("  {} -> {} at {}", r.user_id, r.status.as_str(), clock.display(r.responded_at));
    }
}

pub fn print_task_list(tasks: &[(Task, Resolution)], clock: &BusinessClock) {
    if tasks.is_empty() {
        println!("No tasks found.");
        return;
    }
    for (t, resolution) in tasks {
        let deadline = t.deadline_at.map(|d| clock.display(d)).unwrap_or_default();
        println!(
            "  [{}] {} ({}) {}{}",
            resolution.status.as_str(),
            t.title,
            short(&t.id),
            deadline,
            if t.is_archived() { " archived" } else { "" }
        );
    }
}

pub fn print_shift_list(shifts: &[Shift], clock: &BusinessClock) {
    if shifts.is_empty() {
        println!("No shifts found.");
        return;
    }
    for s in shifts {
        let end = match s.shift_end {
            Some(end) => clock.display(end),
            None => "open".to_string(),
        };
        println!("  {} @{} {} -> {}", short(&s.id), s.user_id, clock.display(s.shift_start), end);
    }
}

pub fn print_settings(settings: &[Setting]) {
    if settings.is_empty() {
        println!("No settings stored; defaults apply.");
        return;
    }
    for s in settings {
        let scope = s.dealership_id.as_deref().unwrap_or("global");
        println!("  {} = {} [{}]", s.key, s.value, scope);
    }
}

fn print_errors(errors: &UnitErrors) {
    if errors.total() > 0 {
        println!(
            "  Skipped: {} configuration, {} integrity, {} failed",
            errors.configuration, errors.integrity, errors.failed
        );
    }
}

fn print_archived(archived: &[ArchivedTask]) {
    for a in archived {
        println!("  {} -> {}", a.task_id, a.reason.as_str());
    }
}

pub fn print_generation_report(report: &GenerationReport) {
    println!(
        "Generated {} task(s) from {} generator(s).",
        report.generated.len(),
        report.generators_checked
    );
    for id in &report.generated {
        println!("  {id}");
    }
    print_errors(&report.errors);
}

pub fn print_archive_report(report: &ArchiveReport) {
    println!(
        "Archived {} task(s) across {} dealership(s).",
        report.archived.len(),
        report.dealerships_checked
    );
    print_archived(&report.archived);
    print_errors(&report.errors);
}

pub fn print_shift_report(report: &ShiftReport) {
    println!(
        "Processed {} shift(s), {} waiting; archived {} task(s).",
        report.processed_shifts.len(),
        report.waiting,
        report.archived.len()
    );
    print_archived(&report.archived);
    print_errors(&report.errors);
}
