//! uplift-runner: one batch run of the voter-persuasion uplift pipeline.
//!
//! Usage:
//!   uplift-runner --data voters.csv --service "python3 model_service.py"
//!   uplift-runner --data voters.csv --service ./svc --config run.json \
//!       --seed 421 --unit-cost 2.5 --campaign-size 50000 --report out.json --profile

use anyhow::{bail, Result};
use std::env;
use uplift_core::{
    config::PipelineConfig,
    pipeline::{PipelineReport, UpliftPipeline},
    service::ExternalTrainer,
};

#[derive(serde::Serialize)]
struct RunReport<'a> {
    run_id:       String,
    generated_at: chrono::DateTime<chrono::Utc>,
    config:       &'a PipelineConfig,
    report:       &'a PipelineReport,
}

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let Some(data) = flag_value(&args, "--data") else {
        bail!("missing --data <path to survey csv>");
    };
    let Some(service) = flag_value(&args, "--service") else {
        bail!("missing --service \"<program> [args..]\"");
    };

    let mut config = match flag_value(&args, "--config") {
        Some(path) => PipelineConfig::load(path)?,
        None => PipelineConfig::default(),
    };
    config.unit_cost = parse_arg(&args, "--unit-cost", config.unit_cost)?;
    config.campaign_size = parse_arg(&args, "--campaign-size", config.campaign_size)?;
    config.train_fraction = parse_arg(&args, "--train-fraction", config.train_fraction)?;
    config.seed = parse_arg(&args, "--seed", config.seed)?;
    config.decile_fraction = parse_arg(&args, "--decile-fraction", config.decile_fraction)?;
    config.permutation_resamples = parse_arg(&args, "--resamples", config.permutation_resamples)?;
    config.emit_profile |= args.iter().any(|a| a == "--profile");

    let mut words = service.split_whitespace().map(str::to_string);
    let Some(program) = words.next() else {
        bail!("--service must name a program");
    };
    let trainer = ExternalTrainer::new(program, words.collect());

    println!("Voter persuasion uplift — uplift-runner");
    println!("  data:           {data}");
    println!("  service:        {service}");
    println!("  seed:           {}", config.seed);
    println!("  train fraction: {}", config.train_fraction);
    println!("  unit cost:      ${:.2}", config.unit_cost);
    println!("  campaign size:  {}", config.campaign_size);
    println!();

    let pipeline = UpliftPipeline::new(config)?;
    let report = pipeline.run_path(data, &trainer)?;

    print_summary(&report);

    if let Some(path) = flag_value(&args, "--report") {
        let run = RunReport {
            run_id:       uuid::Uuid::new_v4().to_string(),
            generated_at: chrono::Utc::now(),
            config:       pipeline.config(),
            report:       &report,
        };
        std::fs::write(path, serde_json::to_string_pretty(&run)?)?;
        log::info!("report written to {path}");
    }

    Ok(())
}

fn print_summary(report: &PipelineReport) {
    if let Some(profile) = &report.profile {
        println!("=== DATA PROFILE ===");
        print!("{profile}");
        println!();
    }

    let e = &report.experiment;
    println!("=== EXPERIMENT ===");
    println!("  rows:           {}", report.selected_rows);
    println!("  treated:        {} (rate {:.4})", e.treated_count, e.treated_rate);
    println!("  control:        {} (rate {:.4})", e.control_count, e.control_rate);
    println!("  difference:     {:.4}", e.rate_difference);
    println!("  p-value:        {:.4} ({} resamples)", e.p_value, e.resamples);
    println!();

    println!("=== SPLIT / SCORING ===");
    println!("  training rows:  {}", report.training_rows);
    println!("  holdout rows:   {}", report.holdout_rows);
    println!("  ranked treated: {}", report.ranked_rows);
    println!();

    println!("=== GAINS ===");
    for g in &report.gains {
        println!(
            "  bin {:>2} | rows {:>5} | rate {:.3} | cum gain {:.3} | lift {:.2}",
            g.bin, g.rows, g.response_rate, g.cumulative_gain, g.lift
        );
    }
    println!();

    let c = &report.campaign;
    println!("=== CAMPAIGN ===");
    println!("  targeted rows:  {}", c.targeted_rows);
    println!("  targeted rate:  {:.4}", c.targeted_response_rate);
    println!("  baseline rate:  {:.4}", c.baseline_rate);
    println!("  uplift diff:    {:.4}", c.uplift_diff);
    println!("  added votes:    {:.0}", c.added_votes);
    println!("  baseline CPV:   ${:.2}", c.baseline_cpv);
    match (c.targeted_cpv, c.cost_savings, c.cost_decrease_pct) {
        (Some(cpv), Some(savings), Some(pct)) => {
            println!("  targeted CPV:   ${cpv:.2}");
            println!("  cost savings:   ${savings:.0}");
            println!("  CPV decrease:   {:.1}%", pct * 100.0);
        }
        _ => println!("  targeted CPV:   undefined (no lift over baseline)"),
    }
}

fn flag_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.windows(2).find(|w| w[0] == flag).map(|w| w[1].as_str())
}

/// Value of `flag`, or `default` when the flag is absent. A flag with a
/// missing or unparsable value is an error, so a typo never silently runs
/// with the default.
fn parse_arg<T>(args: &[String], flag: &str, default: T) -> Result<T>
where
    T: std::str::FromStr + Copy,
    T::Err: std::fmt::Display,
{
    if args.last().is_some_and(|a| a == flag) {
        bail!("{flag} needs a value");
    }
    match flag_value(args, flag) {
        Some(raw) => raw
            .parse()
            .map_err(|e| anyhow::anyhow!("invalid value '{raw}' for {flag}: {e}")),
        None => Ok(default),
    }
}
