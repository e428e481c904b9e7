use comfy_table::{Cell, CellAlignment, Table, presets::UTF8_FULL};
use jiff::{SignedDuration, civil::Time};
use market_optimizer::{
    problem::market_problem::Problem,
    solver::multi_day::multi_day_solution::{DayPlan, MultiDaySolution},
};

pub fn print_solution(problem: &Problem, solution: &MultiDaySolution) {
    for plan in solution.days() {
        println!(
            "\nDay {} ({} markets, stay {} min)",
            plan.day,
            plan.solution.score(),
            format_minutes(plan.stay_duration)
        );

        if plan.solution.is_empty() {
            println!("No market can be visited");
        } else {
            println!("{}", day_table(problem, plan));
        }
    }

    println!("\n{}", summary_table(problem, solution));
}

fn day_table(problem: &Problem, plan: &DayPlan) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL).set_header(vec![
        "#", "Id", "Market", "Travel", "Arrival", "Wait", "Start", "Departure",
    ]);

    for (position, stop) in plan.solution.stops().iter().enumerate() {
        table.add_row(vec![
            Cell::new(position + 1).set_alignment(CellAlignment::Right),
            Cell::new(stop.market_id).set_alignment(CellAlignment::Right),
            Cell::new(problem.market(stop.market).name()),
            Cell::new(format_minutes(stop.travel_time)).set_alignment(CellAlignment::Right),
            Cell::new(format_time(stop.arrival)),
            Cell::new(format_minutes(stop.wait)).set_alignment(CellAlignment::Right),
            Cell::new(format_time(stop.service_start)),
            Cell::new(format_time(stop.departure)),
        ]);
    }

    table
}

fn summary_table(problem: &Problem, solution: &MultiDaySolution) -> Table {
    let unvisited = solution
        .unvisited()
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ");

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_header(vec!["Summary", ""])
        .add_row(vec![
            String::from("Visited"),
            format!("{} / {}", solution.total_score(), problem.num_markets()),
        ])
        .add_row(vec![
            String::from("Travel (min)"),
            format_minutes(solution.total_travel_time()),
        ])
        .add_row(vec![
            String::from("Wait (min)"),
            format_minutes(solution.total_wait_time()),
        ])
        .add_row(vec![String::from("Unvisited"), unvisited]);

    table
}

fn format_time(time: Time) -> String {
    time.strftime("%H:%M").to_string()
}

fn format_minutes(duration: SignedDuration) -> String {
    format!("{:.0}", duration.as_secs_f64() / 60.0)
}
