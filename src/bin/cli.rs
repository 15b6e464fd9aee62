#![cfg(not(tarpaulin_include))]

use expense_survey::definition::Element;
use expense_survey::{AppConfig, PROJECTS_KEY, Survey};
use serde_json::Value;
use std::env;
use std::io::{self, Write};

fn print_help() {
    println!("Commands:");
    println!("  add: Add a new row");
    println!("  rm <row>: Remove a row");
    println!("  set <row> <column> <value>: Set a cell (empty value clears it)");
    println!("  show: Show rows and totals");
    println!("  complete: Complete the survey and print the results");
    println!("  q: Quit");
}

/// Choice text for a dropdown value, or the raw value
fn display_cell(survey: &Survey, column: &str, value: Option<&Value>) -> String {
    let Some(value) = value else {
        return "-".to_string();
    };
    let text = survey
        .definition()
        .matrix(PROJECTS_KEY)
        .ok()
        .and_then(|m| m.column(column))
        .and_then(|c| c.choices.iter().find(|choice| &choice.value == value))
        .map(|choice| choice.text.clone());
    text.unwrap_or_else(|| value.to_string())
}

fn show(survey: &Survey) {
    let Ok(matrix) = survey.definition().matrix(PROJECTS_KEY) else {
        return;
    };

    print!("#\t");
    for col in &matrix.columns {
        print!("{:<18}", col.name);
    }
    println!();

    if let Some(Value::Array(rows)) = survey.get_value(PROJECTS_KEY) {
        for (i, row) in rows.iter().enumerate() {
            print!("{}\t", i);
            for col in &matrix.columns {
                let cell = row.get(&col.name);
                print!("{:<18}", display_cell(survey, &col.name, cell));
            }
            println!();
        }
    }

    for field in survey.summary_fields().iter().filter(|f| f.visible) {
        println!("{}: {}", field.title, field.value);
    }
}

/// Parse user input as JSON when possible, otherwise keep it as text
fn parse_input(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    // Usage: survey-cli [definition.json]
    let mut config = AppConfig::from_env_and_args(&[]);
    if let Some(path) = env::args().nth(1) {
        config.definition_path = Some(path.into());
    }
    let mut survey = Survey::new(config.load_definition()?)?;

    if let Some(title) = &survey.definition().title {
        println!("{}", title);
    }
    if let Some(Element::MatrixDynamic(m)) = survey.definition().find(PROJECTS_KEY) {
        println!("{}", m.title.as_deref().unwrap_or(&m.name));
    }

    let mut status = String::from("ok");
    let mut show_output = true;
    loop {
        if show_output {
            show(&survey);
        }

        print!("({}) > ", status);
        io::stdout().flush()?;

        let mut command = String::new();
        if io::stdin().read_line(&mut command)? == 0 {
            break;
        }
        let command = command.trim();
        let parts: Vec<&str> = command.splitn(4, ' ').collect();

        let result = match parts.as_slice() {
            [] | [""] => {
                status = String::from("invalid command");
                show_output = false;
                continue;
            }
            ["q"] => break,
            ["help"] => {
                print_help();
                show_output = false;
                continue;
            }
            ["show"] => Ok(()),
            ["add"] => survey.add_row(PROJECTS_KEY).map(|_| ()),
            ["rm", row] => match row.parse::<usize>() {
                Ok(index) => survey.remove_row(PROJECTS_KEY, index),
                Err(_) => {
                    status = String::from("invalid row");
                    continue;
                }
            },
            ["set", row, column, rest @ ..] => match row.parse::<usize>() {
                Ok(index) => {
                    let value = rest.first().map(|v| parse_input(v.trim())).unwrap_or(Value::Null);
                    survey.set_cell(PROJECTS_KEY, index, column, value)
                }
                Err(_) => {
                    status = String::from("invalid row");
                    continue;
                }
            },
            ["complete"] => survey.complete().map(|results| println!("{}", results)),
            _ => {
                status = String::from("invalid command");
                continue;
            }
        };

        show_output = true;
        status = match result {
            Ok(()) => String::from("ok"),
            Err(e) => e.to_string(),
        };
    }

    Ok(())
}
