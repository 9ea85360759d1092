use clap::Parser;
use clap_verbosity_flag::Verbosity;
use log::debug;
use std::error::Error;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::str::FromStr;

use admission_planner::config::DEFAULT_MODEL_PATH;
use admission_planner::model::{format_probability, AdmissionFeatures, AdmissionModel};

/// Predict an admission probability from student details typed at the prompt
#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(flatten)]
    verbose: Verbosity,

    /// Trained model artifact (JSON)
    #[arg(long, env = "ADMISSION_MODEL", default_value = DEFAULT_MODEL_PATH)]
    model: PathBuf,
}

/// Asks until the answer parses. `None` once stdin is exhausted.
fn prompt<T: FromStr, R: BufRead>(input: &mut R, label: &str) -> io::Result<Option<T>> {
    let mut line = String::new();
    loop {
        print!("{label}: ");
        io::stdout().flush()?;

        line.clear();
        if input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        match line.trim().parse() {
            Ok(value) => return Ok(Some(value)),
            Err(_) => println!("'{}' is not a valid value, try again.", line.trim()),
        }
    }
}

fn read_features<R: BufRead>(input: &mut R) -> io::Result<Option<AdmissionFeatures>> {
    macro_rules! ask {
        ($label:expr) => {
            match prompt(input, $label)? {
                Some(value) => value,
                None => return Ok(None),
            }
        };
    }

    Ok(Some(AdmissionFeatures {
        high_school_percentage: ask!("High School Percentage"),
        entrance_exam_score: ask!("Entrance Exam Score"),
        cgpa_1st_year: ask!("CGPA 1st Year"),
        cgpa_2nd_year: ask!("CGPA 2nd Year"),
        cgpa_3rd_year: ask!("CGPA 3rd Year"),
        cgpa_4th_year: ask!("CGPA 4th Year"),
        placement_rate: ask!("Placement Rate"),
        average_salary: ask!("Average Salary"),
        economic_condition_index: ask!("Economic Condition Index (1-10)"),
        total_applicants: ask!("Total Applicants"),
        seats_available: ask!("Seats Available"),
    }))
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    env_logger::Builder::new()
        .filter_level(args.verbose.log_level_filter())
        .parse_default_env()
        .init();

    debug!("{args:?}");

    let model = AdmissionModel::load(&args.model)?;

    println!("Enter student details for admission prediction:");
    let stdin = io::stdin();
    let features = read_features(&mut stdin.lock())?.ok_or_else(|| {
        io::Error::new(
            io::ErrorKind::UnexpectedEof,
            "input ended before all student details were entered",
        )
    })?;

    let probability = model.predict_admission(&features)?;
    println!("{}", format_probability(probability));

    Ok(())
}
