//! Interactive privacy request loop.
//!
//! Each iteration uploads the dataset, reconfigures an example policy from
//! the operator's answers, submits a request, and prints access results.

use std::io::{BufRead, BufReader, Stdin, Write};

use serde_json::Value;

use crate::client::PrivacyOpsClient;
use crate::config::PrivacyOpsConfig;
use crate::dataset::load_dataset;
use crate::error::Result;
use crate::provision::{CONNECTION_KEY, PolicyPlan, STORAGE_KEY, apply_policy};
use crate::results::{RESULTS_DEADLINE, RESULTS_POLL_INTERVAL, results_path, wait_for_results};
use crate::types::{ActionType, MaskingStrategy};

pub const EXAMPLE_POLICY_KEY: &str = "example_request_policy";
pub const EXAMPLE_RULE_KEY: &str = "example_policy_rule";

const DEFAULT_CATEGORIES: &str = "user";
const DEFAULT_ACTION: &str = "access";
const DEFAULT_EMAIL: &str = "user@example.com";

/// Source of operator answers.
pub trait Prompter {
    /// Ask a question; an empty answer yields `default`.
    ///
    /// # Errors
    ///
    /// Returns an error if the answer cannot be read.
    fn ask(&mut self, question: &str, default: &str) -> Result<String>;

    /// Ask a yes/no question. Only `y` counts as yes.
    ///
    /// # Errors
    ///
    /// Returns an error if the answer cannot be read.
    fn confirm(&mut self, question: &str) -> Result<bool>;

    /// Wait for the operator between phases, if enabled.
    ///
    /// # Errors
    ///
    /// Returns an error if the terminal cannot be read.
    fn pause(&mut self) -> Result<()>;
}

/// Reads answers line by line, from standard input unless built with
/// [`StdinPrompter::from_reader`].
///
/// Reads block the calling worker through `block_in_place`, so the prompter
/// must run on tokio's multi-threaded runtime.
#[derive(Debug)]
pub struct StdinPrompter<R = BufReader<Stdin>> {
    input: R,
    pause: bool,
}

impl StdinPrompter {
    #[must_use]
    pub fn new(pause: bool) -> Self {
        Self::from_reader(BufReader::new(std::io::stdin()), pause)
    }
}

impl<R: BufRead> StdinPrompter<R> {
    #[must_use]
    pub const fn from_reader(input: R, pause: bool) -> Self {
        Self { input, pause }
    }

    fn read_line(&mut self, question: &str) -> Result<String> {
        #[allow(clippy::print_stdout)]
        {
            println!("{question}");
        }
        std::io::stdout().flush()?;

        let mut line = String::new();
        tokio::task::block_in_place(|| self.input.read_line(&mut line))?;
        Ok(line.trim().to_string())
    }
}

impl<R: BufRead> Prompter for StdinPrompter<R> {
    fn ask(&mut self, question: &str, default: &str) -> Result<String> {
        let answer = self.read_line(&format!("\n{question} [{default}]"))?;
        if answer.is_empty() {
            Ok(default.to_string())
        } else {
            Ok(answer)
        }
    }

    fn confirm(&mut self, question: &str) -> Result<bool> {
        Ok(self.read_line(question)? == "y")
    }

    fn pause(&mut self) -> Result<()> {
        if self.pause {
            self.read_line("Press [enter] to continue...")?;
        }
        Ok(())
    }
}

/// Accepts every default and never asks to continue.
#[derive(Debug, Default)]
pub struct DefaultsPrompter;

impl Prompter for DefaultsPrompter {
    fn ask(&mut self, _question: &str, default: &str) -> Result<String> {
        Ok(default.to_string())
    }

    fn confirm(&mut self, _question: &str) -> Result<bool> {
        Ok(false)
    }

    fn pause(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Operator choices for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestParams {
    pub data_categories: Vec<String>,
    pub action_type: ActionType,
    pub email: String,
}

impl RequestParams {
    /// Ask for data categories, action type, and email, in that order.
    ///
    /// Categories are comma separated. An unknown action type is asked again.
    ///
    /// # Errors
    ///
    /// Returns an error if an answer cannot be read.
    pub fn gather(prompter: &mut dyn Prompter) -> Result<Self> {
        let raw = prompter.ask(
            "Enter a list of target data categories for request policy",
            DEFAULT_CATEGORIES,
        )?;
        let mut data_categories = split_categories(&raw);
        if data_categories.is_empty() {
            data_categories.push(DEFAULT_CATEGORIES.to_string());
        }

        let action_type = loop {
            let raw = prompter.ask(
                "Select the action type for request policy (access or erasure)",
                DEFAULT_ACTION,
            )?;
            match raw.parse::<ActionType>() {
                Ok(action) => break action,
                Err(e) => tracing::warn!("{e}"),
            }
        };

        let email = prompter.ask(
            "Enter an email address to create a privacy request",
            DEFAULT_EMAIL,
        )?;

        Ok(Self {
            data_categories,
            action_type,
            email,
        })
    }

    fn policy(&self) -> PolicyPlan<'static> {
        PolicyPlan {
            policy_key: EXAMPLE_POLICY_KEY,
            rule_key: EXAMPLE_RULE_KEY,
            action_type: self.action_type,
            storage_destination_key: Some(STORAGE_KEY),
            masking_strategy: Some(MaskingStrategy::hmac()),
            data_categories: self.data_categories.clone(),
        }
    }
}

fn split_categories(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(str::to_string)
        .collect()
}

/// What one request produced.
#[derive(Debug)]
pub struct RequestOutcome {
    pub request_id: String,
    /// Uploaded results; present for access requests only.
    pub results: Option<Value>,
}

/// Run a single privacy request end to end.
///
/// # Errors
///
/// Returns the first failing call's error, or a results timeout for access
/// requests whose upload never appears.
pub async fn run_request(
    client: &PrivacyOpsClient,
    config: &PrivacyOpsConfig,
    prompter: &mut dyn Prompter,
) -> Result<RequestOutcome> {
    prompter.pause()?;

    let dataset = load_dataset(&config.dataset_path)?;
    client.validate_dataset(CONNECTION_KEY, &dataset).await?;
    client.put_dataset(CONNECTION_KEY, &dataset).await?;

    let params = RequestParams::gather(prompter)?;
    apply_policy(client, &params.policy()).await?;

    let request_id = client
        .create_privacy_request(&params.email, EXAMPLE_POLICY_KEY)
        .await?;

    let results = if params.action_type == ActionType::Access {
        #[allow(clippy::print_stdout)]
        {
            println!(
                "Waiting for privacy request results to upload to {}...",
                results_path(&config.results_dir, &request_id).display()
            );
        }
        let results = wait_for_results(
            &config.results_dir,
            &request_id,
            RESULTS_DEADLINE,
            RESULTS_POLL_INTERVAL,
        )
        .await?;

        let pretty = serde_json::to_string_pretty(&results)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        #[allow(clippy::print_stdout)]
        {
            println!("{pretty}");
        }
        Some(results)
    } else {
        None
    };

    Ok(RequestOutcome {
        request_id,
        results,
    })
}

/// Run requests until the operator declines another.
///
/// # Errors
///
/// Returns the first failing request's error.
pub async fn request_loop(
    client: &PrivacyOpsClient,
    config: &PrivacyOpsConfig,
    prompter: &mut dyn Prompter,
) -> Result<()> {
    loop {
        let outcome = run_request(client, config, prompter).await?;
        tracing::info!(request_id = %outcome.request_id, "Privacy request complete");

        if !prompter.confirm("Complete! Press [y] to execute another request (or any key to quit)")? {
            return Ok(());
        }
    }
}
