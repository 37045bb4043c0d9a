use clap::Parser;
use quick_calc::config::{Command, PercentCommand};
use quick_calc::core::format::{format_money, format_rate};
use quick_calc::core::ConfigProvider;
use quick_calc::domain::model::{Conversion, ConverterState, SUPPORTED_CURRENCIES};
use quick_calc::utils::error::{CalcError, ErrorSeverity};
use quick_calc::utils::logger;
use quick_calc::utils::validation::{validate_currency_code, Validate};
use quick_calc::{
    AppConfig, CliConfig, CurrencyConverter, ExchangeRateApi, PercentageMode, TipInput,
};
use std::sync::Arc;
use std::time::Duration;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = CliConfig::parse();

    logger::init_cli_logger(cli.verbose);
    tracing::debug!("CLI config: {:?}", cli);

    let config = match AppConfig::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => exit_with(&e),
    };

    if let Err(e) = config.validate() {
        exit_with(&e);
    }

    if let Err(e) = run(cli.command, &config).await {
        exit_with(&e);
    }

    Ok(())
}

fn exit_with(e: &CalcError) -> ! {
    tracing::error!(
        "{} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 {}", e.recovery_suggestion());

    let exit_code = match e.severity() {
        ErrorSeverity::Low => 0,
        ErrorSeverity::Medium => 2,
        ErrorSeverity::High => 1,
        ErrorSeverity::Critical => 3,
    };
    std::process::exit(exit_code);
}

async fn run(command: Command, config: &AppConfig) -> quick_calc::Result<()> {
    match command {
        Command::Tip {
            bill,
            tip,
            custom_tip,
            people,
        } => {
            let preset = tip.unwrap_or_else(|| config.default_tip_preset());
            let input = TipInput::from_text(&bill, preset, &custom_tip, &people);
            let result = input.calculate();

            println!(
                "Tip ({}%):  {}",
                input.rate.percentage(),
                format_money(result.tip_amount, "USD")
            );
            println!("Total:      {}", format_money(result.total, "USD"));
            println!(
                "Per person: {} ({} people)",
                format_money(result.per_person, "USD"),
                input.party_size
            );
        }
        Command::Percent { mode } => {
            let mode = match mode {
                PercentCommand::Of { percentage, base } => {
                    PercentageMode::percent_of_text(&percentage, &base)
                }
                PercentCommand::What { part, total } => {
                    PercentageMode::what_percent_text(&part, &total)
                }
            };
            println!("{}", mode.describe());
        }
        Command::Convert { amount, from, to } => {
            let from = from.unwrap_or_else(|| config.default_from().to_string());
            let to = to.unwrap_or_else(|| config.default_to().to_string());
            validate_currency_code("from", &from)?;
            validate_currency_code("to", &to)?;

            let converter = CurrencyConverter::new(ExchangeRateApi::from_config(config));
            // Failure is already reflected in the status warning.
            let _ = converter.ensure_rates(&from).await;

            let conversion = converter.convert_text(&amount, &from, &to).await;
            print_conversion(&conversion);
            if let Some(warning) = converter.status().warning {
                println!("⚠️ {}", warning);
            }
        }
        Command::Watch {
            amount,
            from,
            to,
            interval,
        } => {
            let from = from.unwrap_or_else(|| config.default_from().to_string());
            let to = to.unwrap_or_else(|| config.default_to().to_string());
            validate_currency_code("from", &from)?;
            validate_currency_code("to", &to)?;
            let period =
                Duration::from_secs(interval.unwrap_or(config.refresh_interval_seconds()).max(1));

            watch(config, &amount, &from, &to, period).await;
        }
        Command::Currencies => {
            for currency in SUPPORTED_CURRENCIES.iter() {
                println!("{:<4} {}", currency.symbol, currency.label());
            }
        }
    }

    Ok(())
}

async fn watch(config: &AppConfig, amount: &str, from: &str, to: &str, period: Duration) {
    let converter = Arc::new(CurrencyConverter::new(ExchangeRateApi::from_config(config)));
    let mut status_rx = converter.subscribe();
    let poller = converter.spawn_poller(from, period);

    tracing::info!("Auto-updating {} rates every {:?}, Ctrl-C to stop", from, period);

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            _ = &mut ctrl_c => break,
            changed = status_rx.changed() => {
                if changed.is_err() {
                    break;
                }
                let status = status_rx.borrow_and_update().clone();
                if status.state == ConverterState::Fetching {
                    tracing::debug!("Updating rates...");
                    continue;
                }

                let conversion = converter.convert_text(amount, from, to).await;
                print_conversion(&conversion);
                match (status.warning, status.last_updated) {
                    (Some(warning), _) => println!("⚠️ {}", warning),
                    (None, Some(at)) => println!(
                        "⏰ Rates updated: {}",
                        at.with_timezone(&chrono::Local).format("%Y-%m-%d %H:%M:%S")
                    ),
                    (None, None) => {}
                }
            }
        }
    }

    poller.shutdown().await;
    tracing::info!("Stopped");
}

fn print_conversion(conversion: &Conversion) {
    println!("{}", format_rate(&conversion.from, &conversion.to, conversion.rate));
    println!(
        "{} {} = {} {}",
        format_money(conversion.amount, &conversion.from),
        conversion.from,
        format_money(conversion.result, &conversion.to),
        conversion.to
    );
}
