//! Fetch command implementation

use crate::cli::output::{format_updates_json, format_updates_table, UpdateView};
use crate::cli::{load_config, FetchArgs};
use crate::fetch::{today, Dataset, Fetcher};

/// Handle `covidash fetch` command
///
/// Updates the selected datasets and returns the formatted reports.
pub async fn handle_fetch(args: &FetchArgs) -> Result<String, Box<dyn std::error::Error>> {
    let mut config = load_config(&args.config)?;
    if let Some(ref dir) = args.data_dir {
        config.data.dir = dir.clone();
    }
    let start = args.start_date.unwrap_or(config.data.start_date);
    let end = args.end_date.unwrap_or_else(today);
    if start > end {
        return Err(format!("start date {} is after end date {}", start, end).into());
    }

    let fetcher = Fetcher::new(&config.data)?;
    let datasets = match args.only {
        Some(dataset) => vec![dataset],
        None => Dataset::ALL.to_vec(),
    };

    let mut updates = Vec::with_capacity(datasets.len());
    for dataset in datasets {
        let report = match dataset {
            Dataset::Contagions => {
                fetcher
                    .update_contagions(
                        &config.data.contagions_dir(),
                        start,
                        args.end_date,
                        args.force,
                    )
                    .await?
            }
            Dataset::Vaccinations => {
                fetcher
                    .update_vaccinations(&config.data.vaccinations_dir(), args.force)
                    .await?
            }
        };
        updates.push(UpdateView { dataset, report });
    }

    if args.json {
        Ok(format_updates_json(&updates)?)
    } else {
        Ok(format_updates_table(&updates))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::path::PathBuf;

    #[tokio::test]
    async fn test_fetch_rejects_reversed_dates() {
        let args = FetchArgs {
            config: PathBuf::from("/nonexistent/covidash.toml"),
            force: false,
            only: Some(Dataset::Contagions),
            start_date: NaiveDate::from_ymd_opt(2021, 3, 10),
            end_date: NaiveDate::from_ymd_opt(2021, 3, 1),
            data_dir: None,
            json: false,
        };

        let err = handle_fetch(&args).await.unwrap_err();
        assert!(err.to_string().contains("after end date"));
    }

    #[tokio::test]
    async fn test_fetch_rejects_start_after_today() {
        let start = today() + chrono::Duration::days(30);
        let args = FetchArgs {
            config: PathBuf::from("/nonexistent/covidash.toml"),
            force: false,
            only: Some(Dataset::Contagions),
            start_date: Some(start),
            end_date: None,
            data_dir: None,
            json: false,
        };

        let err = handle_fetch(&args).await.unwrap_err().to_string();
        assert!(err.contains(&start.to_string()), "{}", err);
        assert!(err.contains(&today().to_string()), "{}", err);
    }
}
