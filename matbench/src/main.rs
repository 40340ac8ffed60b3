use matbench_core::backend::SoftwareBackend;
use matbench_core::gpu::WgpuContext;
use matbench_core::{driver, Error};
use matbench_types::{RunConfig, StrategyTag, TimingSample};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

fn print_usage() {
    eprintln!("Usage: matbench [OPTIONS]");
    eprintln!();
    eprintln!("  --sizes <list>       Comma-separated problem sizes (default: 512)");
    eprintln!("  --strategies <list>  Comma-separated: seq,threaded,naive,local,1d (default: all)");
    eprintln!("  --adapter <name>     Substring to match against GPU adapter names");
    eprintln!("  --rounds <n>         Timed dispatches per strategy/size, median reported (default: 1)");
    eprintln!("  --config <file>      JSON run configuration (flags override it)");
    eprintln!("  --software           Run kernel strategies on the software backend");
    eprintln!("  --help               Show this help");
}

fn parse_sizes(arg: &str) -> Option<Vec<usize>> {
    arg.split(',').map(|s| s.trim().parse().ok()).collect()
}

fn parse_strategies(arg: &str) -> Option<Vec<StrategyTag>> {
    arg.split(',').map(|s| StrategyTag::parse(s.trim())).collect()
}

fn print_report(samples: &[TimingSample]) {
    for s in samples {
        println!("{}: N={}, MFLOPS={}", s.tag.label(), s.n, s.mflops);
    }
}

fn main() {
    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_filter(
                    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("off")),
                ),
        )
        .init();

    let args: Vec<String> = std::env::args().collect();

    let mut config: Option<RunConfig> = None;
    let mut sizes: Option<Vec<usize>> = None;
    let mut strategies: Option<Vec<StrategyTag>> = None;
    let mut adapter: Option<String> = None;
    let mut rounds: Option<usize> = None;
    let mut software = false;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--config" => {
                i += 1;
                if i < args.len() {
                    let text = match std::fs::read_to_string(&args[i]) {
                        Ok(text) => text,
                        Err(e) => {
                            eprintln!("Failed to read {}: {}", args[i], e);
                            std::process::exit(1);
                        }
                    };
                    match serde_json::from_str(&text) {
                        Ok(cfg) => config = Some(cfg),
                        Err(e) => {
                            eprintln!("Invalid config {}: {}", args[i], e);
                            std::process::exit(1);
                        }
                    }
                }
            }
            "--sizes" => {
                i += 1;
                if i < args.len() {
                    match parse_sizes(&args[i]) {
                        Some(parsed) => sizes = Some(parsed),
                        None => {
                            eprintln!("Invalid size list: {}", args[i]);
                            std::process::exit(1);
                        }
                    }
                }
            }
            "--strategies" => {
                i += 1;
                if i < args.len() {
                    match parse_strategies(&args[i]) {
                        Some(parsed) => strategies = Some(parsed),
                        None => {
                            eprintln!("Unknown strategy in: {}", args[i]);
                            std::process::exit(1);
                        }
                    }
                }
            }
            "--adapter" => {
                i += 1;
                if i < args.len() {
                    adapter = Some(args[i].clone());
                }
            }
            "--rounds" => {
                i += 1;
                if i < args.len() {
                    match args[i].parse() {
                        Ok(parsed) => rounds = Some(parsed),
                        Err(_) => {
                            eprintln!("Invalid rounds: {}", args[i]);
                            std::process::exit(1);
                        }
                    }
                }
            }
            "--software" => {
                software = true;
            }
            "--help" | "-h" => {
                print_usage();
                return;
            }
            other => {
                eprintln!("Unknown flag: {}", other);
                print_usage();
                std::process::exit(1);
            }
        }
        i += 1;
    }

    let mut config = config.unwrap_or_default();
    if let Some(sizes) = sizes {
        config.sizes = sizes;
    }
    if let Some(strategies) = strategies {
        config.strategies = strategies;
    }
    if let Some(adapter) = adapter {
        config.adapter = adapter;
    }
    if let Some(rounds) = rounds {
        config.rounds = rounds;
    }

    tracing::info!(
        sizes = ?config.sizes,
        strategies = config.strategies.len(),
        rounds = config.rounds,
        software,
        "run configured"
    );

    let needs_gpu = !software
        && config
            .strategies
            .iter()
            .any(|tag| tag.dispatch_kind() == matbench_types::DispatchKind::Kernel);

    let result = if needs_gpu {
        match WgpuContext::new(&config.adapter) {
            Ok(ctx) => {
                eprintln!("Running on {}", ctx.adapter_name());
                driver::run(&ctx, &config)
            }
            Err(e) => Err(e),
        }
    } else {
        driver::run(&SoftwareBackend, &config)
    };

    match result {
        Ok(samples) => print_report(&samples),
        Err(e) => {
            match &e {
                Error::Setup(msg) => eprintln!("Setup failed: {}", msg),
                Error::Build(msg) => eprintln!("Kernel build failed:\n{}", msg),
                Error::Invocation(msg) => eprintln!("Dispatch failed: {}", msg),
                Error::Verification(msg) => eprintln!("Oracle verification failed: {}", msg),
                Error::Agreement(msg) => eprintln!("Baseline agreement failed: {}", msg),
            }
            std::process::exit(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn size_lists_parse() {
        assert_eq!(parse_sizes("128,256, 512"), Some(vec![128, 256, 512]));
        assert_eq!(parse_sizes("128,abc"), None);
    }

    #[test]
    fn strategy_lists_parse() {
        assert_eq!(
            parse_strategies("seq,1d"),
            Some(vec![StrategyTag::Sequential, StrategyTag::Tiled1d])
        );
        assert_eq!(parse_strategies("seq,cuda"), None);
    }
}
