// src/cli.rs
//! # CLI Module / 命令行模块
//!
//! Command-line glue. [`run_registry`] is the `main` of a `harness = false`
//! test binary: it parses flags, runs the registry with console output, writes
//! reports and turns the outcome into an exit code. [`run_tool`] backs the
//! `suitekit` executable.
//!
//! 命令行胶水代码。[`run_registry`] 是 `harness = false` 测试二进制的入口：
//! 解析参数、带控制台输出运行注册表、写入报告并将结果转换为退出码。
//! [`run_tool`] 支撑 `suitekit` 可执行文件。

pub mod init;

use anyhow::Result;
use clap::{Arg, ArgAction, ArgMatches, Command};
use colored::*;
use std::ffi::OsString;
use std::path::PathBuf;
use std::process::ExitCode;

use crate::core::config::{resolve_run_config, RunConfig};
use crate::core::registry::Registry;
use crate::core::runner::RunOptions;
use crate::infra::t;
use crate::reporting::console::{event_printer, print_failure_details, print_summary, print_test_list};
use crate::reporting::{generate_html_report, write_json_report};

/// Pre-parses the command line arguments to find the language setting.
/// This allows i18n to be initialized before the full CLI is built.
/// It looks for a `--lang <VALUE>` argument.
fn pre_parse_language(args: &[OsString]) -> Option<String> {
    let pos = args.iter().position(|arg| arg == "--lang")?;
    args.get(pos + 1).map(|lang| lang.to_string_lossy().into_owned())
}

/// Flags accepted by a harness binary, on top of the configuration file.
/// 测试二进制接受的参数，叠加在配置文件之上。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HarnessArgs {
    pub config: Option<PathBuf>,
    pub lang: Option<String>,
    pub bail: bool,
    pub grep: Option<String>,
    pub only_suite: Option<String>,
    pub only_test: Option<String>,
    pub list: bool,
    pub html: Option<PathBuf>,
    pub json: Option<PathBuf>,
}

impl HarnessArgs {
    fn from_matches(matches: &ArgMatches) -> Self {
        Self {
            config: matches.get_one::<PathBuf>("config").cloned(),
            lang: matches.get_one::<String>("lang").cloned(),
            bail: matches.get_flag("bail"),
            grep: matches.get_one::<String>("grep").cloned(),
            only_suite: matches.get_one::<String>("only-suite").cloned(),
            only_test: matches.get_one::<String>("only-test").cloned(),
            list: matches.get_flag("list"),
            html: matches.get_one::<PathBuf>("html").cloned(),
            json: matches.get_one::<PathBuf>("json").cloned(),
        }
    }

    /// Command-line flags win over the configuration file.
    /// 命令行参数优先于配置文件。
    pub fn apply(&self, config: &mut RunConfig) {
        if let Some(lang) = &self.lang {
            config.language = lang.clone();
        }
        if self.bail {
            config.bail = true;
        }
        if self.grep.is_some() {
            config.grep = self.grep.clone();
        }
        if self.only_suite.is_some() || self.only_test.is_some() {
            let mut only = config.only.clone().unwrap_or_default();
            if self.only_suite.is_some() {
                only.suite = self.only_suite.clone();
            }
            if self.only_test.is_some() {
                only.test = self.only_test.clone();
            }
            config.only = Some(only);
        }
        if self.html.is_some() {
            config.report.html = self.html.clone();
        }
        if self.json.is_some() {
            config.report.json = self.json.clone();
        }
    }
}

fn build_cli(locale: &str) -> Command {
    Command::new("suitekit-harness")
        .version(env!("CARGO_PKG_VERSION"))
        .about(t!("cli.about", locale = locale).to_string())
        .arg(
            Arg::new("lang")
                .long("lang")
                .help(t!("cli.lang", locale = locale).to_string())
                .value_name("LANGUAGE")
                .action(ArgAction::Set),
        )
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .help(t!("cli.config", locale = locale).to_string())
                .value_name("CONFIG")
                .value_parser(clap::value_parser!(PathBuf))
                .action(ArgAction::Set),
        )
        .arg(
            Arg::new("bail")
                .long("bail")
                .help(t!("cli.bail", locale = locale).to_string())
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("grep")
                .short('g')
                .long("grep")
                .help(t!("cli.grep", locale = locale).to_string())
                .value_name("TEXT")
                .action(ArgAction::Set),
        )
        .arg(
            Arg::new("only-suite")
                .long("only-suite")
                .help(t!("cli.only_suite", locale = locale).to_string())
                .value_name("SUITE")
                .action(ArgAction::Set),
        )
        .arg(
            Arg::new("only-test")
                .long("only-test")
                .help(t!("cli.only_test", locale = locale).to_string())
                .value_name("TEST")
                .action(ArgAction::Set),
        )
        .arg(
            Arg::new("list")
                .long("list")
                .help(t!("cli.list", locale = locale).to_string())
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("html")
                .long("html")
                .help(t!("cli.html", locale = locale).to_string())
                .value_name("HTML")
                .value_parser(clap::value_parser!(PathBuf))
                .action(ArgAction::Set),
        )
        .arg(
            Arg::new("json")
                .long("json")
                .help(t!("cli.json", locale = locale).to_string())
                .value_name("JSON")
                .value_parser(clap::value_parser!(PathBuf))
                .action(ArgAction::Set),
        )
}

/// Parses harness flags from an explicit argument list (first item is the program name).
pub fn parse_harness_args<I, T>(args: I) -> Result<HarnessArgs>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    let args: Vec<OsString> = args.into_iter().map(Into::into).collect();
    let locale = crate::resolve_locale(&pre_parse_language(&args).unwrap_or_else(|| "en".to_string()));
    let matches = build_cli(locale).try_get_matches_from(args)?;
    Ok(HarnessArgs::from_matches(&matches))
}

/// Entry point for `harness = false` test binaries.
///
/// ```no_run
/// # async fn demo() -> std::process::ExitCode {
/// let mut registry = suitekit::Registry::new();
/// // ... describe / it ...
/// suitekit::cli::run_registry(&registry).await
/// # }
/// ```
pub async fn run_registry(registry: &Registry) -> ExitCode {
    match run_registry_with(registry, std::env::args_os()).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("{} {:#}", "Error:".red(), e);
            ExitCode::FAILURE
        }
    }
}

/// Same as [`run_registry`] with explicit arguments. Returns `Ok(true)` when nothing failed.
/// 与 [`run_registry`] 相同但参数显式给出。没有失败时返回 `Ok(true)`。
pub async fn run_registry_with<I, T>(registry: &Registry, args: I) -> Result<bool>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    crate::init();
    let harness = parse_harness_args(args)?;
    let mut config = resolve_run_config(harness.config.as_deref())?;
    harness.apply(&mut config);

    let locale = crate::resolve_locale(&config.language);
    rust_i18n::set_locale(locale);

    if harness.list {
        print_test_list(&registry.list_tests(), locale);
        return Ok(true);
    }

    let options = RunOptions::from_config(&config).on_event(event_printer(locale));
    let results = registry.run(options).await;

    print_summary(&results, locale);
    write_reports(&results, &config, locale);
    print_failure_details(&results, locale);

    let failed = results.iter().filter(|r| r.is_failure()).count();
    if failed == 0 {
        println!("\n{}", t!("summary.all_passed", locale = locale).green().bold());
        Ok(true)
    } else {
        println!("\n{}", t!("summary.some_failed", locale = locale, count = failed).red().bold());
        Ok(false)
    }
}

fn write_reports(results: &[crate::core::models::TestResult], config: &RunConfig, locale: &str) {
    if let Some(path) = &config.report.html {
        match generate_html_report(results, path, locale) {
            Ok(()) => println!("{}", t!("report.html_written", locale = locale, path = path.display())),
            Err(e) => eprintln!("{} {:#}", t!("report.write_failed", locale = locale).red(), e),
        }
    }
    if let Some(path) = &config.report.json {
        match write_json_report(results, path) {
            Ok(()) => println!("{}", t!("report.json_written", locale = locale, path = path.display())),
            Err(e) => eprintln!("{} {:#}", t!("report.write_failed", locale = locale).red(), e),
        }
    }
}

fn build_tool_cli(locale: &str) -> Command {
    Command::new("suitekit")
        .version(env!("CARGO_PKG_VERSION"))
        .about(t!("cli.tool_about", locale = locale).to_string())
        .arg(
            Arg::new("lang")
                .long("lang")
                .help(t!("cli.lang", locale = locale).to_string())
                .value_name("LANGUAGE")
                .global(true)
                .action(ArgAction::Set),
        )
        .subcommand(
            Command::new("init")
                .about(t!("cli.init_about", locale = locale).to_string())
                .arg(
                    Arg::new("output")
                        .short('o')
                        .long("output")
                        .help(t!("cli.output", locale = locale).to_string())
                        .value_name("PATH")
                        .default_value(crate::core::config::DEFAULT_CONFIG_FILE)
                        .value_parser(clap::value_parser!(PathBuf))
                        .action(ArgAction::Set),
                )
                .arg(
                    Arg::new("force")
                        .long("force")
                        .help(t!("cli.force", locale = locale).to_string())
                        .action(ArgAction::SetTrue),
                ),
        )
        .subcommand_required(true)
        .arg_required_else_help(true)
}

/// Backs the `suitekit` executable.
pub fn run_tool() -> Result<()> {
    let args: Vec<OsString> = std::env::args_os().collect();
    let language = match pre_parse_language(&args) {
        Some(lang) => crate::resolve_locale(&lang),
        None => {
            crate::init();
            crate::resolve_locale(&rust_i18n::locale())
        }
    };
    rust_i18n::set_locale(language);

    let matches = build_tool_cli(language).get_matches_from(args);
    if let Some(("init", init_matches)) = matches.subcommand() {
        let output = init_matches
            .get_one::<PathBuf>("output")
            .cloned()
            .unwrap_or_else(|| PathBuf::from(crate::core::config::DEFAULT_CONFIG_FILE));
        let force = init_matches.get_flag("force");
        init::execute(&output, force, language)?;
    }
    Ok(())
}
