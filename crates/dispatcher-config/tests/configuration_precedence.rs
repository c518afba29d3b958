//! Behavioural coverage for configuration layering.

use std::cell::RefCell;
use std::ffi::OsString;
use std::fs;
use std::sync::{Mutex, MutexGuard, PoisonError};

use once_cell::sync::Lazy;
use ortho_config::OrthoConfig;
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use tempfile::TempDir;

use dispatcher_config::{Config, FailureReporting, default_topic_read};

static ENV_MUTEX: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));

struct Harness {
    _env_guard: MutexGuard<'static, ()>,
    temp_dir: TempDir,
    cli_args: RefCell<Vec<OsString>>,
    env_overrides: RefCell<Vec<(String, Option<OsString>)>>,
    loaded: RefCell<Option<Config>>,
    error: RefCell<Option<String>>,
}

impl Harness {
    fn new() -> Self {
        let temp_dir = match TempDir::new() {
            Ok(dir) => dir,
            Err(error) => panic!("failed to create temporary directory: {error}"),
        };
        Self {
            _env_guard: ENV_MUTEX.lock().unwrap_or_else(PoisonError::into_inner),
            temp_dir,
            cli_args: RefCell::new(vec![OsString::from("dispatcherd")]),
            env_overrides: RefCell::new(Vec::new()),
            loaded: RefCell::new(None),
            error: RefCell::new(None),
        }
    }

    fn write_config(&self, contents: &str) {
        let path = self.temp_dir.path().join("dispatcher.toml");
        if let Err(error) = fs::write(&path, contents) {
            panic!("failed to write configuration: {error}");
        }

        let mut args = self.cli_args.borrow_mut();
        args.push(OsString::from("--config-path"));
        args.push(path.into_os_string());
    }

    fn set_env(&self, key: &str, value: &str) {
        let previous = std::env::var_os(key);
        // Environment mutation is `unsafe` under edition 2024; the harness
        // restores every override in `Drop`.
        unsafe { std::env::set_var(key, value) };
        self.env_overrides
            .borrow_mut()
            .push((key.to_owned(), previous));
    }

    fn push_cli_arg(&self, arg: impl Into<OsString>) {
        self.cli_args.borrow_mut().push(arg.into());
    }

    fn load(&self) {
        if self.loaded.borrow().is_some() || self.error.borrow().is_some() {
            return;
        }

        let args = self.cli_args.borrow().clone();
        match Config::load_from_iter(args) {
            Ok(config) => {
                *self.loaded.borrow_mut() = Some(config);
            }
            Err(error) => {
                *self.error.borrow_mut() = Some(error.to_string());
            }
        }
    }

    fn config(&self) -> Config {
        self.load();
        match self.loaded.borrow().as_ref() {
            Some(config) => config.clone(),
            None => panic!(
                "configuration failed to load: {:?}",
                self.error.borrow().as_deref()
            ),
        }
    }
}

impl Drop for Harness {
    fn drop(&mut self) {
        let mut overrides = self.env_overrides.borrow_mut();
        while let Some((key, value)) = overrides.pop() {
            if let Some(os_value) = value {
                unsafe { std::env::set_var(&key, os_value) };
            } else {
                unsafe { std::env::remove_var(&key) };
            }
        }
    }
}

#[fixture]
fn harness() -> Harness {
    Harness::new()
}

#[given("a configuration file setting the read topic to \"{topic}\"")]
fn given_file_topic(harness: &Harness, topic: String) {
    harness.write_config(&format!("topic_read = \"{}\"\n", topic.trim_matches('"')));
}

#[given("a configuration file enabling failure publishing")]
fn given_file_failure_publishing(harness: &Harness) {
    harness.write_config("failure_reporting = \"publish\"\n");
}

#[given("the environment overrides the read topic to \"{topic}\"")]
fn given_env_topic(harness: &Harness, topic: String) {
    harness.set_env("DISPATCHER_TOPIC_READ", topic.trim_matches('"'));
}

#[given("the environment sets the write partition to \"{raw}\"")]
fn given_env_partition(harness: &Harness, raw: String) {
    harness.set_env("DISPATCHER_PARTITION_WRITE", raw.trim_matches('"'));
}

#[given("the environment sets the API token to \"{token}\"")]
fn given_env_token(harness: &Harness, token: String) {
    harness.set_env("DISPATCHER_USER_TOKEN", token.trim_matches('"'));
}

#[given("the command line overrides the read topic to \"{topic}\"")]
fn given_cli_topic(harness: &Harness, topic: String) {
    harness.push_cli_arg("--topic-read");
    harness.push_cli_arg(topic.trim_matches('"'));
}

#[when("the configuration is loaded")]
fn when_loaded(harness: &Harness) {
    harness.load();
}

#[then("the read topic is \"{topic}\"")]
fn then_read_topic(harness: &Harness, topic: String) {
    assert_eq!(harness.config().topic_read, topic.trim_matches('"'));
}

#[then("the read topic is the default")]
fn then_default_topic(harness: &Harness) {
    assert_eq!(harness.config().topic_read, default_topic_read());
}

#[then("failure publishing is enabled")]
fn then_failure_publishing(harness: &Harness) {
    assert_eq!(harness.config().failure_reporting, FailureReporting::Publish);
}

#[then("the write partition cannot be parsed")]
fn then_partition_unparseable(harness: &Harness) {
    assert!(harness.config().write_partition().is_err());
}

#[then("the write partition is {index}")]
fn then_partition_index(harness: &Harness, index: i32) {
    match harness.config().write_partition() {
        Ok(partition) => assert_eq!(partition.get(), index),
        Err(error) => panic!("write partition should parse: {error}"),
    }
}

#[then("the API token is \"{token}\"")]
fn then_api_token(harness: &Harness, token: String) {
    assert_eq!(harness.config().user_token.expose(), token.trim_matches('"'));
}

#[scenario(
    path = "tests/features/configuration_precedence.feature",
    name = "Defaults apply when nothing is configured"
)]
fn defaults_apply(harness: Harness) {
    drop(harness);
}

#[scenario(
    path = "tests/features/configuration_precedence.feature",
    name = "Configuration file values are honoured"
)]
fn file_values_apply(harness: Harness) {
    drop(harness);
}

#[scenario(
    path = "tests/features/configuration_precedence.feature",
    name = "Environment overrides the configuration file"
)]
fn environment_overrides_file(harness: Harness) {
    drop(harness);
}

#[scenario(
    path = "tests/features/configuration_precedence.feature",
    name = "Command line overrides the environment"
)]
fn cli_overrides_environment(harness: Harness) {
    drop(harness);
}

#[scenario(
    path = "tests/features/configuration_precedence.feature",
    name = "Malformed partition text still loads"
)]
fn malformed_partition_loads(harness: Harness) {
    drop(harness);
}

#[scenario(
    path = "tests/features/configuration_precedence.feature",
    name = "Numeric partition from the environment"
)]
fn numeric_partition_loads(harness: Harness) {
    drop(harness);
}

#[scenario(
    path = "tests/features/configuration_precedence.feature",
    name = "All-digit API token from the environment"
)]
fn numeric_token_loads(harness: Harness) {
    drop(harness);
}
