use chrono::NaiveDate;
use quarterly_tasks::{
    ApplicationRegistry, Quarter, Recurrence, Scheduler, SqliteStore, TaskInstance, TaskStatus,
    load_tasks_from_csv, load_tasks_from_json, save_tasks_to_csv, save_tasks_to_json,
    validation,
};
use quarterly_tasks::expansion::{interval, monthly, weekly};
use quarterly_tasks::persistence::{
    ApplicationStore, SchedulerStore, TaskStore,
};
use std::io::{self, Write};

fn print_help() {
    println!(
        "Commands:\n  help                                        Show this help\n  scheduler weekly <owner> <day 0-6> <name...>   Create a weekly scheduler (0=Monday)\n  scheduler monthly <owner> <day 1-28> <name...> Create a monthly scheduler\n  scheduler interval <owner> <days> <name> [subtasks_csv]\n                                              Create an interval group (sub-tasks cycled)\n  scheduler list <owner>                      List schedulers for an owner\n  scheduler rename <id> <name...>             Rename a scheduler\n  scheduler delete <id>                       Delete a scheduler\n  apply <scheduler_id> <Q1-Q4> <year>         Expand a scheduler into a quarter\n  revoke <application_id>                     Delete an application (tasks stay)\n  applications <owner> [<Q1-Q4> <year>]       List quarterly applications\n  tasks <owner>                               List tasks for an owner\n  tasks <owner> pending                       List pending tasks\n  tasks <owner> <YYYY-MM-DD>                  List tasks on a date\n  status <task_id> <pending|completed|deferred|cancelled>\n  move <task_id> <YYYY-MM-DD>                 Reschedule a task\n  delete <task_id>                            Delete a task\n  preview weekly <day 0-6> <year> <Q1-Q4>     Show weekly expansion dates\n  preview monthly <day 1-28> <year> <Q1-Q4>   Show monthly expansion dates\n  preview interval <days> <year> <Q1-Q4>      Show a randomized interval expansion\n  export <json|csv> <owner> <path>            Export an owner's tasks to disk\n  import <json|csv> <path>                    Bulk-insert tasks from disk\n  quit|exit                                   Exit"
    );
}

fn render_task_table(tasks: &[TaskInstance]) -> String {
    let headers = ["id", "name", "date", "status", "comments"];
    let mut rows: Vec<[String; 5]> = Vec::with_capacity(tasks.len());
    for task in tasks {
        rows.push([
            task.id.map(|v| v.to_string()).unwrap_or_default(),
            task.name.clone(),
            task.date.to_string(),
            task.status.as_str().to_string(),
            task.comments.clone(),
        ]);
    }

    let mut widths: Vec<usize> = headers.iter().map(|h| h.len()).collect();
    for row in &rows {
        for (ci, cell) in row.iter().enumerate() {
            if cell.len() > widths[ci] {
                widths[ci] = cell.len();
            }
        }
    }

    let mut sep = String::from("+");
    for w in &widths {
        sep.push_str(&"-".repeat(*w + 2));
        sep.push('+');
    }

    let mut out = String::new();
    out.push_str(&sep);
    out.push('\n');
    out.push('|');
    for (ci, header) in headers.iter().enumerate() {
        out.push(' ');
        out.push_str(header);
        out.push_str(&" ".repeat(widths[ci] - header.len()));
        out.push_str(" |");
    }
    out.push('\n');
    out.push_str(&sep);
    out.push('\n');
    for row in &rows {
        out.push('|');
        for (ci, cell) in row.iter().enumerate() {
            out.push(' ');
            out.push_str(cell);
            out.push_str(&" ".repeat(widths[ci] - cell.len()));
            out.push_str(" |");
        }
        out.push('\n');
    }
    out.push_str(&sep);
    out.push('\n');
    out
}

fn parse_date_arg(input: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(input, "%Y-%m-%d").ok()
}

fn parse_subtask_list(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

fn print_dates(dates: &[NaiveDate]) {
    for date in dates {
        println!("  {date}");
    }
    println!("{} dates.", dates.len());
}

fn create_scheduler(registry: &ApplicationRegistry<SqliteStore>, scheduler: Scheduler) {
    if let Err(err) = validation::validate_scheduler(&scheduler) {
        println!("Invalid scheduler: {err}");
        return;
    }
    match registry.store().insert_scheduler(&scheduler) {
        Ok(id) => println!("Created scheduler {} ({})", id, scheduler.selector_label()),
        Err(err) => println!("Error creating scheduler: {err}"),
    }
}

fn main() {
    let db_path =
        std::env::var("QUARTERLY_TASKS_DB").unwrap_or_else(|_| "quarterly-tasks.db".to_string());
    let store = match SqliteStore::new(&db_path) {
        Ok(store) => store,
        Err(err) => {
            eprintln!("Could not open database {db_path}: {err}");
            std::process::exit(1);
        }
    };
    let registry = ApplicationRegistry::new(store);

    println!("Quarterly Tasks (CLI) - type 'help' for commands\n");

    let stdin = io::stdin();
    let mut line = String::new();
    loop {
        print!("> ");
        let _ = io::stdout().flush();
        line.clear();
        if stdin.read_line(&mut line).is_err() || line.is_empty() {
            break;
        }
        let input = line.trim();
        if input.is_empty() {
            continue;
        }

        let mut parts = input.split_whitespace();
        let cmd = parts.next().unwrap_or("");

        match cmd {
            "help" => print_help(),
            "quit" | "exit" => break,
            "scheduler" => match parts.next() {
                Some("weekly") => {
                    let owner_s = parts.next();
                    let day_s = parts.next();
                    let rest: Vec<&str> = parts.collect();
                    match (owner_s, day_s, !rest.is_empty()) {
                        (Some(owner_s), Some(day_s), true) => {
                            let (Ok(owner_id), Ok(day_of_week)) =
                                (owner_s.parse::<i64>(), day_s.parse::<u8>())
                            else {
                                println!("Invalid owner or day_of_week");
                                continue;
                            };
                            let scheduler = Scheduler::new(
                                rest.join(" "),
                                owner_id,
                                Recurrence::Weekly { day_of_week },
                            );
                            create_scheduler(&registry, scheduler);
                        }
                        _ => println!("Usage: scheduler weekly <owner> <day 0-6> <name...>"),
                    }
                }
                Some("monthly") => {
                    let owner_s = parts.next();
                    let day_s = parts.next();
                    let rest: Vec<&str> = parts.collect();
                    match (owner_s, day_s, !rest.is_empty()) {
                        (Some(owner_s), Some(day_s), true) => {
                            let (Ok(owner_id), Ok(day_of_month)) =
                                (owner_s.parse::<i64>(), day_s.parse::<u32>())
                            else {
                                println!("Invalid owner or day_of_month");
                                continue;
                            };
                            let scheduler = Scheduler::new(
                                rest.join(" "),
                                owner_id,
                                Recurrence::Monthly { day_of_month },
                            );
                            create_scheduler(&registry, scheduler);
                        }
                        _ => println!("Usage: scheduler monthly <owner> <day 1-28> <name...>"),
                    }
                }
                Some("interval") => {
                    let owner_s = parts.next();
                    let days_s = parts.next();
                    let name = parts.next();
                    let subtasks_s = parts.next();
                    match (owner_s, days_s, name) {
                        (Some(owner_s), Some(days_s), Some(name)) => {
                            let (Ok(owner_id), Ok(interval_days)) =
                                (owner_s.parse::<i64>(), days_s.parse::<i64>())
                            else {
                                println!("Invalid owner or interval_days");
                                continue;
                            };
                            let subtasks =
                                subtasks_s.map(parse_subtask_list).unwrap_or_default();
                            let scheduler = Scheduler::new(
                                name,
                                owner_id,
                                Recurrence::Interval {
                                    interval_days,
                                    subtasks,
                                },
                            );
                            create_scheduler(&registry, scheduler);
                        }
                        _ => println!(
                            "Usage: scheduler interval <owner> <days> <name> [subtasks_csv]"
                        ),
                    }
                }
                Some("list") => match parts.next().and_then(|s| s.parse::<i64>().ok()) {
                    Some(owner_id) => match registry.store().schedulers_for_owner(owner_id) {
                        Ok(schedulers) => {
                            for scheduler in &schedulers {
                                println!(
                                    "  {}  {}",
                                    scheduler.id.unwrap_or_default(),
                                    scheduler.selector_label()
                                );
                            }
                            println!("{} schedulers.", schedulers.len());
                        }
                        Err(err) => println!("Error: {err}"),
                    },
                    None => println!("Usage: scheduler list <owner>"),
                },
                Some("rename") => {
                    let id_s = parts.next();
                    let rest: Vec<&str> = parts.collect();
                    match (id_s.and_then(|s| s.parse::<i64>().ok()), !rest.is_empty()) {
                        (Some(id), true) => {
                            match registry.store().rename_scheduler(id, &rest.join(" ")) {
                                Ok(true) => println!("Scheduler {id} renamed."),
                                Ok(false) => println!("Scheduler {id} not found."),
                                Err(err) => println!("Error: {err}"),
                            }
                        }
                        _ => println!("Usage: scheduler rename <id> <name...>"),
                    }
                }
                Some("delete") => match parts.next().and_then(|s| s.parse::<i64>().ok()) {
                    Some(id) => match registry.store().delete_scheduler(id) {
                        Ok(true) => println!("Scheduler {id} deleted."),
                        Ok(false) => println!("Scheduler {id} not found."),
                        Err(err) => println!("Error: {err}"),
                    },
                    None => println!("Usage: scheduler delete <id>"),
                },
                _ => println!("Usage: scheduler weekly|monthly|interval|list|rename|delete ..."),
            },
            "apply" => {
                let id_s = parts.next().and_then(|s| s.parse::<i64>().ok());
                let quarter = parts.next().and_then(|s| s.parse::<Quarter>().ok());
                let year = parts.next().and_then(|s| s.parse::<i32>().ok());
                match (id_s, quarter, year) {
                    (Some(scheduler_id), Some(quarter), Some(year)) => {
                        match registry.apply(&mut rand::thread_rng(), scheduler_id, quarter, year)
                        {
                            Ok(outcome) => {
                                println!(
                                    "Applied scheduler {scheduler_id} to {quarter} {year} \
                                     (application {}, {} tasks):",
                                    outcome.application_id,
                                    outcome.task_ids.len()
                                );
                                print_dates(&outcome.dates);
                            }
                            Err(err) => println!("Apply failed: {err}"),
                        }
                    }
                    _ => println!("Usage: apply <scheduler_id> <Q1-Q4> <year>"),
                }
            }
            "revoke" => match parts.next().and_then(|s| s.parse::<i64>().ok()) {
                Some(id) => match registry.revoke(id) {
                    Ok(()) => println!("Application {id} revoked (generated tasks kept)."),
                    Err(err) => println!("Revoke failed: {err}"),
                },
                None => println!("Usage: revoke <application_id>"),
            },
            "applications" => {
                let owner = parts.next().and_then(|s| s.parse::<i64>().ok());
                let quarter = parts.next().and_then(|s| s.parse::<Quarter>().ok());
                let year = parts.next().and_then(|s| s.parse::<i32>().ok());
                match owner {
                    Some(owner_id) => {
                        let result = match (quarter, year) {
                            (Some(quarter), Some(year)) => registry
                                .store()
                                .applications_for_quarter(owner_id, quarter, year),
                            _ => registry.store().applications_for_owner(owner_id),
                        };
                        match result {
                            Ok(applications) => {
                                for app in &applications {
                                    println!("  {}  {}", app.id.unwrap_or_default(), app);
                                }
                                println!("{} applications.", applications.len());
                            }
                            Err(err) => println!("Error: {err}"),
                        }
                    }
                    None => println!("Usage: applications <owner> [<Q1-Q4> <year>]"),
                }
            }
            "tasks" => {
                let owner = parts.next().and_then(|s| s.parse::<i64>().ok());
                let filter = parts.next();
                match owner {
                    Some(owner_id) => {
                        let result = match filter {
                            Some("pending") => registry.store().pending_tasks(owner_id),
                            Some(date_s) => match parse_date_arg(date_s) {
                                Some(date) => registry.store().tasks_on_date(owner_id, date),
                                None => {
                                    println!("Invalid date (YYYY-MM-DD) or filter");
                                    continue;
                                }
                            },
                            None => registry.store().tasks_for_owner(owner_id),
                        };
                        match result {
                            Ok(tasks) => print!("{}", render_task_table(&tasks)),
                            Err(err) => println!("Error: {err}"),
                        }
                    }
                    None => println!("Usage: tasks <owner> [pending|YYYY-MM-DD]"),
                }
            }
            "status" => {
                let id = parts.next().and_then(|s| s.parse::<i64>().ok());
                let status = parts.next().and_then(TaskStatus::from_str);
                match (id, status) {
                    (Some(id), Some(status)) => {
                        match registry.store().set_task_status(id, status) {
                            Ok(true) => println!("Task {id} is now {}.", status.as_str()),
                            Ok(false) => println!("Task {id} not found."),
                            Err(err) => println!("Error: {err}"),
                        }
                    }
                    _ => println!("Usage: status <task_id> <pending|completed|deferred|cancelled>"),
                }
            }
            "move" => {
                let id = parts.next().and_then(|s| s.parse::<i64>().ok());
                let date = parts.next().and_then(parse_date_arg);
                match (id, date) {
                    (Some(id), Some(date)) => match registry.store().reschedule_task(id, date) {
                        Ok(true) => println!("Task {id} moved to {date}."),
                        Ok(false) => println!("Task {id} not found."),
                        Err(err) => println!("Error: {err}"),
                    },
                    _ => println!("Usage: move <task_id> <YYYY-MM-DD>"),
                }
            }
            "delete" => match parts.next().and_then(|s| s.parse::<i64>().ok()) {
                Some(id) => match registry.store().delete_task(id) {
                    Ok(true) => println!("Task {id} deleted."),
                    Ok(false) => println!("Task {id} not found."),
                    Err(err) => println!("Error: {err}"),
                },
                None => println!("Usage: delete <task_id>"),
            },
            "preview" => {
                let kind = parts.next();
                let first = parts.next().and_then(|s| s.parse::<i64>().ok());
                let year = parts.next().and_then(|s| s.parse::<i32>().ok());
                let quarter = parts.next().and_then(|s| s.parse::<Quarter>().ok());
                match (kind, first, year, quarter) {
                    (Some("weekly"), Some(day), Some(year), Some(quarter)) => {
                        match validation::validate_day_of_week(day as u8) {
                            Ok(weekday) => {
                                print_dates(&weekly::all_occurrences(weekday, year, quarter))
                            }
                            Err(err) => println!("Invalid input: {err}"),
                        }
                    }
                    (Some("monthly"), Some(day), Some(year), Some(quarter)) => {
                        match validation::validate_day_of_month(day as u32) {
                            Ok(()) => print_dates(&monthly::all_occurrences(
                                year,
                                quarter,
                                day as u32,
                            )),
                            Err(err) => println!("Invalid input: {err}"),
                        }
                    }
                    (Some("interval"), Some(days), Some(year), Some(quarter)) => {
                        match validation::validate_interval_days(days) {
                            Ok(()) => print_dates(&interval::all_occurrences(
                                &mut rand::thread_rng(),
                                days,
                                year,
                                quarter,
                            )),
                            Err(err) => println!("Invalid input: {err}"),
                        }
                    }
                    _ => println!("Usage: preview weekly|monthly|interval <n> <year> <Q1-Q4>"),
                }
            }
            "export" => {
                let fmt = parts.next();
                let owner = parts.next().and_then(|s| s.parse::<i64>().ok());
                let path = parts.next();
                match (fmt, owner, path) {
                    (Some(fmt @ ("json" | "csv")), Some(owner_id), Some(path)) => {
                        let tasks = match registry.store().tasks_for_owner(owner_id) {
                            Ok(tasks) => tasks,
                            Err(err) => {
                                println!("Error: {err}");
                                continue;
                            }
                        };
                        let result = if fmt == "json" {
                            save_tasks_to_json(&tasks, path)
                        } else {
                            save_tasks_to_csv(&tasks, path)
                        };
                        match result {
                            Ok(()) => println!("{} tasks exported to {path}.", tasks.len()),
                            Err(err) => println!("Error exporting tasks: {err}"),
                        }
                    }
                    _ => println!("Usage: export <json|csv> <owner> <path>"),
                }
            }
            "import" => {
                let fmt = parts.next();
                let path = parts.next();
                match (fmt, path) {
                    (Some(fmt @ ("json" | "csv")), Some(path)) => {
                        let loaded = if fmt == "json" {
                            load_tasks_from_json(path)
                        } else {
                            load_tasks_from_csv(path)
                        };
                        match loaded {
                            Ok(tasks) => match registry.store().bulk_insert_tasks(&tasks) {
                                Ok(ids) => println!("Imported {} tasks from {path}.", ids.len()),
                                Err(err) => println!("Error inserting tasks: {err}"),
                            },
                            Err(err) => println!("Error loading {path}: {err}"),
                        }
                    }
                    _ => println!("Usage: import <json|csv> <path>"),
                }
            }
            _ => println!("Unknown command. Type 'help'."),
        }
    }
}
