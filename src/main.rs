use std::io::Read;
use std::path::PathBuf;
use std::process::ExitCode;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use scraper::Html;
use tracing_subscriber::EnvFilter;

use feutools::{
    export, filter, grades, html, run, timetable, Action, Anchor, Config, Error, Outcome, Response,
    Result,
};

#[derive(Parser)]
#[clap(version, about, long_about = None)]
struct Args {
    /// Saved portal page, `-` for stdin
    #[clap(short, long, value_name = "HTML FILE", default_value = "-", global = true)]
    input: String,

    /// TOML file overriding selectors and output settings
    #[clap(short, long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    /// Date the class times are attached to, default to today
    #[clap(short, long, value_name = "YYYY-MM-DD", global = true)]
    date: Option<NaiveDate>,

    /// Print the response envelope as JSON
    #[clap(short, long, global = true)]
    json: bool,

    /// More logs on stderr
    #[clap(short, long, global = true)]
    verbose: bool,

    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Export the schedule table to CSV
    Export {
        /// Output file, default to the configured name
        #[clap(short, long, value_name = "FILE NAME")]
        output: Option<PathBuf>,
    },
    /// Build the schedule payload for the companion app
    Schedule {
        /// Print the companion app URL instead of the JSON
        #[clap(short, long)]
        url: bool,

        /// Choose which courses to keep
        #[clap(short, long)]
        select: bool,

        /// Show the schedule grid
        #[clap(long)]
        display: bool,
    },
    /// Compute the midterm and final GWA
    Gwa {
        /// Print the annotated table rows as HTML
        #[clap(long)]
        html: bool,
    },
}

impl Command {
    fn action(&self) -> Action {
        match self {
            Self::Export { .. } => Action::ExtractSchedule,
            Self::Schedule { .. } => Action::ExtractScheduleForSchedinator,
            Self::Gwa { .. } => Action::CalculateGwa,
        }
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)))
        .with_writer(std::io::stderr)
        .init();
}

fn read_input(input: &str) -> Result<String> {
    if input == "-" {
        let mut page = String::new();
        std::io::stdin().read_to_string(&mut page)?;
        Ok(page)
    } else {
        Ok(std::fs::read_to_string(input)?)
    }
}

fn execute(args: &Args) -> Result<ExitCode> {
    let config = match &args.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    let anchor = args.date.map_or_else(Anchor::today, Anchor::on);

    let page = read_input(&args.input)?;
    let document = Html::parse_document(&page);

    let outcome = run(args.command.action(), &document, &anchor, &config);

    if args.json {
        let code = if outcome.is_ok() {
            ExitCode::SUCCESS
        } else {
            ExitCode::FAILURE
        };
        println!("{}", serde_json::to_string_pretty(&Response::from(outcome))?);
        return Ok(code);
    }

    match (&args.command, outcome?) {
        (Command::Export { output }, Outcome::Csv(csv)) => {
            let path = output
                .clone()
                .unwrap_or_else(|| PathBuf::from(&config.csv_filename));
            let written = export::write_csv(&path, &csv)?;
            println!("CSV exported => {}", written.display());
        }
        (
            Command::Schedule {
                url,
                select,
                display,
            },
            Outcome::Schedule(mut summary),
        ) => {
            if *select {
                summary = filter::courses(summary, &config)?;
            }
            if *display {
                print!("{}", timetable::display(&summary, &anchor.offset, 10));
            }
            if *url {
                println!("{}", export::companion_url(&config.companion_url, &summary)?);
            } else if !*display {
                println!("{}", export::payload_json(&summary)?);
            }
        }
        (Command::Gwa { html: as_html }, Outcome::Gwa { result, table }) => {
            if *as_html {
                print!("{}", html::render_grade_rows(&table, &result.annotations, &config));
            } else {
                print!("{}", grades::display(&table, &result.annotations, 12));
                let summary = grades::models::GradeSummary::from(&result);
                println!("Midterm GWA: {}", summary.midterm_gwa);
                println!("Final GWA:   {}", summary.final_gwa);
            }
        }
        (_, outcome) => {
            return Err(Error::Unexpected(format!(
                "{:?} gave an unexpected outcome: {outcome:?}",
                args.command.action()
            )))
        }
    }

    Ok(ExitCode::SUCCESS)
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(args.verbose);

    match execute(&args) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{e}");
            ExitCode::FAILURE
        }
    }
}
