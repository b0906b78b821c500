use chrono::NaiveDate;
use plan_tool::{
    Dependency, DependencyType, ProjectPlan, ScheduleResult, WorkPackage, load_project_from_csv,
    load_project_from_json, save_project_to_csv, save_project_to_json,
};
use std::io::{self, Write};
use std::str::FromStr;

fn render_schedule_table(result: &ScheduleResult) -> String {
    let headers = [
        "id", "name", "wp", "dur", "ES", "EF", "LS", "LF", "slack", "crit", "start", "end",
    ];
    let mut rows: Vec<Vec<String>> = Vec::with_capacity(result.tasks.len());
    for st in &result.tasks {
        rows.push(vec![
            st.task.id.clone(),
            st.task.name.clone(),
            st.task.work_package_id.clone(),
            st.task.duration_days.to_string(),
            st.early_start.to_string(),
            st.early_finish.to_string(),
            st.late_start.to_string(),
            st.late_finish.to_string(),
            st.slack.to_string(),
            if st.is_critical { "*" } else { "" }.to_string(),
            st.start_date.to_string(),
            st.end_date.to_string(),
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

    let mut sep = String::new();
    sep.push('+');
    for w in &widths {
        sep.push_str(&"-".repeat(*w + 2));
        sep.push('+');
    }

    let render_row = |cells: &[String], widths: &[usize]| {
        let mut line = String::from("|");
        for (ci, cell) in cells.iter().enumerate() {
            line.push(' ');
            line.push_str(cell);
            line.push_str(&" ".repeat(widths[ci] - cell.len()));
            line.push(' ');
            line.push('|');
        }
        line
    };

    let header_cells: Vec<String> = headers.iter().map(|h| h.to_string()).collect();
    let mut out = String::new();
    out.push_str(&sep);
    out.push('\n');
    out.push_str(&render_row(&header_cells, &widths));
    out.push('\n');
    out.push_str(&sep);
    out.push('\n');
    for row in &rows {
        out.push_str(&render_row(row, &widths));
        out.push('\n');
    }
    out.push_str(&sep);
    out.push('\n');
    out
}

fn print_schedule(plan: &ProjectPlan) {
    match plan.compute() {
        Ok(result) => {
            for warning in &result.warnings {
                println!("warning: {warning}");
            }
            println!("{}", render_schedule_table(&result));
            println!(
                "project: {} days, {} -> {}",
                result.stats.duration, result.stats.start_date, result.stats.end_date
            );
        }
        Err(e) => println!("Error computing schedule: {e}"),
    }
}

fn print_help() {
    println!(
        "Commands:\n  help                               Show this help\n  show                               Compute and display the schedule\n  add <id> <name> <duration> <wp_id> Upsert a task\n  dep <id> <source_id> <FS|SS|FF|SF> Add a dependency to a task\n  cleardeps <id>                     Remove all dependencies of a task\n  constraint <id> <YYYY-MM-DD|none>  Set or clear a start-no-earlier-than date\n  delete <id>                        Delete a task and clean up references\n  wp <id> <name...>                  Upsert a work package\n  delwp <id>                         Delete a work package\n  meta show                          Show project metadata\n  meta name <text...>                Update project name\n  meta desc <text...>                Update project description\n  start <YYYY-MM-DD>                 Move project start (shifts constraints)\n  end <YYYY-MM-DD>                   Pin project end (derives a new start)\n  compute                            Recompute and print a summary\n  save <json|csv> <path>             Persist the project to disk\n  load <json|csv> <path>             Load a project from disk\n  quit|exit                          Exit"
    );
}

fn parse_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .init();

    let mut plan = ProjectPlan::new();
    println!("plan-tool interactive CLI. Type 'help' for commands.");

    let stdin = io::stdin();
    loop {
        print!("> ");
        let _ = io::stdout().flush();

        let mut input = String::new();
        if stdin.read_line(&mut input).unwrap_or(0) == 0 {
            break;
        }
        let input = input.trim();
        if input.is_empty() {
            continue;
        }

        let mut parts = input.split_whitespace();
        let cmd = parts.next().unwrap_or("");

        match cmd {
            "help" => print_help(),
            "quit" | "exit" => break,
            "show" => print_schedule(&plan),
            "add" => {
                let (id_s, name_s, dur_s, wp_s) =
                    (parts.next(), parts.next(), parts.next(), parts.next());
                match (id_s, name_s, dur_s, wp_s) {
                    (Some(id), Some(name), Some(dur_s), Some(wp)) => {
                        let duration: i64 = match dur_s.parse() {
                            Ok(v) => v,
                            Err(_) => {
                                println!("Invalid duration");
                                continue;
                            }
                        };
                        match plan.upsert_task(id, name, duration, wp) {
                            Ok(_) => println!("Task upserted."),
                            Err(e) => println!("Error: {e}"),
                        }
                    }
                    _ => println!("Usage: add <id> <name> <duration> <wp_id>"),
                }
            }
            "dep" => {
                let (id_s, src_s, kind_s) = (parts.next(), parts.next(), parts.next());
                match (id_s, src_s, kind_s) {
                    (Some(id), Some(source), Some(kind_s)) => {
                        let kind = match DependencyType::from_str(kind_s) {
                            Ok(k) => k,
                            Err(e) => {
                                println!("{e}");
                                continue;
                            }
                        };
                        match plan.find_task(id) {
                            Ok(Some(task)) => {
                                let mut deps = task.dependencies;
                                deps.push(Dependency::new(source, kind));
                                match plan.set_dependencies(id, deps) {
                                    Ok(_) => println!("Dependency added."),
                                    Err(e) => println!("Error: {e}"),
                                }
                            }
                            Ok(None) => println!("Task {id} not found."),
                            Err(e) => println!("Error: {e}"),
                        }
                    }
                    _ => println!("Usage: dep <id> <source_id> <FS|SS|FF|SF>"),
                }
            }
            "cleardeps" => match parts.next() {
                Some(id) => match plan.set_dependencies(id, Vec::new()) {
                    Ok(_) => println!("Dependencies cleared."),
                    Err(e) => println!("Error: {e}"),
                },
                None => println!("Usage: cleardeps <id>"),
            },
            "constraint" => {
                let (id_s, date_s) = (parts.next(), parts.next());
                match (id_s, date_s) {
                    (Some(id), Some("none")) => match plan.set_constraint_date(id, None) {
                        Ok(_) => println!("Constraint cleared."),
                        Err(e) => println!("Error: {e}"),
                    },
                    (Some(id), Some(date_s)) => match parse_date(date_s) {
                        Some(date) => match plan.set_constraint_date(id, Some(date)) {
                            Ok(_) => println!("Constraint set."),
                            Err(e) => println!("Error: {e}"),
                        },
                        None => println!("Invalid date (YYYY-MM-DD)"),
                    },
                    _ => println!("Usage: constraint <id> <YYYY-MM-DD|none>"),
                }
            }
            "delete" => match parts.next() {
                Some(id) => match plan.delete_task(id) {
                    Ok(true) => println!("Deleted task {id}."),
                    Ok(false) => println!("Task {id} not found."),
                    Err(e) => println!("Error deleting task: {e}"),
                },
                None => println!("Usage: delete <id>"),
            },
            "wp" => {
                let id_s = parts.next();
                let name = parts.collect::<Vec<_>>().join(" ");
                match id_s {
                    Some(id) if !name.is_empty() => {
                        plan.upsert_work_package(WorkPackage::new(id, name));
                        println!("Work package upserted.");
                    }
                    _ => println!("Usage: wp <id> <name...>"),
                }
            }
            "delwp" => match parts.next() {
                Some(id) => {
                    if plan.delete_work_package(id) {
                        println!("Deleted work package {id}.");
                    } else {
                        println!("Work package {id} not found.");
                    }
                }
                None => println!("Usage: delwp <id>"),
            },
            "meta" => match parts.next() {
                Some("show") => {
                    let md = plan.metadata();
                    println!(
                        "name: {}\ndescription: {}\nstart: {}",
                        md.project_name, md.project_description, md.project_start_date
                    );
                }
                Some("name") => {
                    let name = parts.collect::<Vec<_>>().join(" ");
                    if name.is_empty() {
                        println!("Usage: meta name <text...>");
                    } else {
                        plan.set_project_name(name);
                        println!("Project name updated.");
                    }
                }
                Some("desc") => {
                    let desc = parts.collect::<Vec<_>>().join(" ");
                    if desc.is_empty() {
                        println!("Usage: meta desc <text...>");
                    } else {
                        plan.set_project_description(desc);
                        println!("Project description updated.");
                    }
                }
                _ => println!("Usage: meta <show|name|desc> ..."),
            },
            "start" => match parts.next().and_then(parse_date) {
                Some(date) => match plan.set_project_start_date(date) {
                    Ok(_) => println!("Project start moved to {date}."),
                    Err(e) => println!("Error: {e}"),
                },
                None => println!("Usage: start <YYYY-MM-DD>"),
            },
            "end" => match parts.next().and_then(parse_date) {
                Some(date) => match plan.set_project_end_date(date) {
                    Ok(_) => println!(
                        "Project start moved to {} to end on {date}.",
                        plan.project_start_date()
                    ),
                    Err(e) => println!("Error: {e}"),
                },
                None => println!("Usage: end <YYYY-MM-DD>"),
            },
            "compute" => match plan.refresh() {
                Ok(summary) => {
                    println!("Computed ({})", summary.to_cli_summary());
                    print_schedule(&plan);
                }
                Err(e) => println!("Compute error: {e}"),
            },
            "save" => {
                let (fmt_s, path_s) = (parts.next(), parts.next());
                match (fmt_s, path_s) {
                    (Some("json"), Some(path)) => match save_project_to_json(&plan, path) {
                        Ok(_) => println!("Saved to {path}."),
                        Err(e) => println!("Error: {e}"),
                    },
                    (Some("csv"), Some(path)) => match save_project_to_csv(&plan, path) {
                        Ok(_) => println!("Saved to {path}."),
                        Err(e) => println!("Error: {e}"),
                    },
                    _ => println!("Usage: save <json|csv> <path>"),
                }
            }
            "load" => {
                let (fmt_s, path_s) = (parts.next(), parts.next());
                let loaded = match (fmt_s, path_s) {
                    (Some("json"), Some(path)) => Some(load_project_from_json(path)),
                    (Some("csv"), Some(path)) => Some(load_project_from_csv(path)),
                    _ => {
                        println!("Usage: load <json|csv> <path>");
                        None
                    }
                };
                if let Some(result) = loaded {
                    match result {
                        Ok(new_plan) => {
                            plan = new_plan;
                            println!("Project loaded.");
                            print_schedule(&plan);
                        }
                        Err(e) => println!("Error loading project: {e}"),
                    }
                }
            }
            other => println!("Unknown command '{other}'. Type 'help' for commands."),
        }
    }
}
