use crate::{
    core::{agent::DEFAULT_MAX_STEPS, model::LanguageModel, RevisionAgent},
    data::{demo_vacation_info, weather_context, MockTravelData, TravelDataSource, DEMO_TRAVELER_FEEDBACK},
    evals::{all_evaluators, initial_evaluators, run_evaluations, EvalContext, EvaluationResults},
    services::{openai_client::DEFAULT_MODEL, ItineraryPlanner, OpenAIClient},
    storage::{
        load_plan_document, load_reusable_plan, save_plan_document, PlanDocument,
        DEFAULT_OUTPUT_DIR, OUTPUT_FILE, REVISED_OUTPUT_FILE,
    },
    tools::{
        ActivitiesTool, CalculatorTool, FinalAnswerTool, RunEvalsTool, ToolDispatcher,
        ToolRegistry, WeatherTool,
    },
    vacation_types::{TravelPlan, VacationInfo},
};
use anyhow::{anyhow, Context};
use clap::{value_parser, Arg, ArgMatches, Command};
use std::{
    env,
    path::{Path, PathBuf},
    sync::Arc,
    time::Duration,
};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

const DEFAULT_JUDGE_MODEL: &str = "gpt-4.1-nano";

/// CLI entry point for the itinerary agent
pub async fn run() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let matches = command().get_matches();
    let Some((subcommand, sub_matches)) = matches.subcommand() else {
        return Err(anyhow!("a subcommand is required"));
    };

    let result = match subcommand {
        "plan" => Session::from_matches(sub_matches)?.plan_command().await,
        "revise" => Session::from_matches(sub_matches)?.revise_command().await,
        "evaluate" => Session::from_matches(sub_matches)?.evaluate_command(sub_matches).await,
        "run" => Session::from_matches(sub_matches)?.run_command().await,
        other => Err(anyhow!("unknown subcommand `{other}`")),
    };

    if let Err(err) = &result {
        error!("{} failed: {:#}", subcommand, err);
    }
    result
}

fn command() -> Command {
    Command::new("itinerary-agent")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Plans a trip to AgentsVille, then revises it from traveler feedback")
        .subcommand_required(true)
        .arg(
            Arg::new("model")
                .short('m')
                .long("model")
                .value_name("MODEL")
                .global(true)
                .help("Model used for planning, revision and feedback judgments (or set MODEL env var)"),
        )
        .arg(
            Arg::new("api-key")
                .short('k')
                .long("api-key")
                .value_name("KEY")
                .global(true)
                .help("API key (or set OPENAI_API_KEY env var)"),
        )
        .arg(
            Arg::new("base-url")
                .short('u')
                .long("base-url")
                .value_name("URL")
                .global(true)
                .help("Provider base URL (or set OPENAI_BASE_URL / OPENROUTER_BASE_URL env vars)"),
        )
        .arg(
            Arg::new("timeout")
                .short('t')
                .long("timeout")
                .value_name("SECONDS")
                .global(true)
                .value_parser(value_parser!(u64))
                .help("Request timeout in seconds"),
        )
        .arg(
            Arg::new("max-steps")
                .short('s')
                .long("max-steps")
                .value_name("COUNT")
                .global(true)
                .value_parser(value_parser!(usize))
                .help("Maximum revision steps [default: 15]"),
        )
        .arg(
            Arg::new("vacation")
                .long("vacation")
                .value_name("FILE")
                .global(true)
                .value_parser(value_parser!(PathBuf))
                .help("JSON file with the vacation request (defaults to the demo trip)"),
        )
        .arg(
            Arg::new("feedback")
                .short('f')
                .long("feedback")
                .value_name("TEXT")
                .global(true)
                .help("Traveler feedback for the revision"),
        )
        .arg(
            Arg::new("output-dir")
                .short('o')
                .long("output-dir")
                .value_name("DIR")
                .global(true)
                .value_parser(value_parser!(PathBuf))
                .help("Directory for saved plan documents [default: outputs]"),
        )
        .subcommand(Command::new("plan").about("Plan the initial itinerary and evaluate it"))
        .subcommand(Command::new("revise").about("Revise the saved itinerary from traveler feedback"))
        .subcommand(
            Command::new("evaluate")
                .about("Run every evaluator on a saved plan document")
                .arg(
                    Arg::new("plan-file")
                        .value_name("FILE")
                        .index(1)
                        .value_parser(value_parser!(PathBuf))
                        .help("Plan document to evaluate (defaults to the revised output)"),
                ),
        )
        .subcommand(Command::new("run").about("Plan, evaluate, revise and evaluate again"))
}

/// Everything one CLI invocation needs, resolved from flags and environment.
struct Session {
    vacation: VacationInfo,
    feedback: String,
    output_dir: PathBuf,
    max_steps: usize,
    source: Arc<dyn TravelDataSource>,
    model: Arc<dyn LanguageModel>,
    judge: Arc<dyn LanguageModel>,
}

impl Session {
    fn from_matches(matches: &ArgMatches) -> anyhow::Result<Self> {
        // Get API key from argument or environment
        let api_key = matches
            .get_one::<String>("api-key")
            .cloned()
            .or_else(|| env::var("OPENAI_API_KEY").ok())
            .ok_or_else(|| {
                anyhow!("API key is required. Set OPENAI_API_KEY environment variable or use --api-key")
            })?;

        let base_url = matches
            .get_one::<String>("base-url")
            .cloned()
            .or_else(|| env::var("OPENAI_BASE_URL").ok())
            .or_else(|| env::var("OPENROUTER_BASE_URL").ok());
        let model_name = matches
            .get_one::<String>("model")
            .cloned()
            .or_else(|| env::var("MODEL").ok())
            .unwrap_or_else(|| DEFAULT_MODEL.to_string());
        let judge_name = env::var("JUDGE_MODEL").unwrap_or_else(|_| DEFAULT_JUDGE_MODEL.to_string());
        let timeout = matches.get_one::<u64>("timeout").map(|secs| Duration::from_secs(*secs));

        let client = |name: &str| {
            let mut client = OpenAIClient::new(api_key.clone())
                .with_model(name)
                .with_timeout(timeout);
            if let Some(url) = &base_url {
                client.set_base_url(url.clone());
            }
            client
        };

        let vacation = match matches.get_one::<PathBuf>("vacation") {
            Some(path) => load_vacation(path)?,
            None => demo_vacation_info()?,
        };

        info!(model = %model_name, judge = %judge_name, destination = %vacation.destination, "session configured");

        Ok(Self {
            vacation,
            feedback: matches
                .get_one::<String>("feedback")
                .cloned()
                .unwrap_or_else(|| DEMO_TRAVELER_FEEDBACK.to_string()),
            output_dir: matches
                .get_one::<PathBuf>("output-dir")
                .cloned()
                .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_DIR)),
            max_steps: matches
                .get_one::<usize>("max-steps")
                .copied()
                .unwrap_or(DEFAULT_MAX_STEPS),
            source: Arc::new(MockTravelData::load()?),
            model: Arc::new(client(&model_name)),
            judge: Arc::new(client(&judge_name)),
        })
    }

    async fn plan_command(&self) -> anyhow::Result<()> {
        let plan = self.initial_plan().await?;
        print_plan("Initial itinerary", &plan)?;
        let results = self.evaluate(&initial_evaluators(self.source.clone(), self.judge.clone()), &plan, None).await?;
        print_results(&results)
    }

    async fn revise_command(&self) -> anyhow::Result<()> {
        let path = self.output_dir.join(OUTPUT_FILE);
        let plan = load_reusable_plan(&path, &self.vacation).ok_or_else(|| {
            anyhow!(
                "no itinerary for this vacation request in {}; run `plan` first",
                path.display()
            )
        })?;
        let revised = self.revise(&plan).await?;
        print_plan("Revised itinerary", &revised)
    }

    async fn evaluate_command(&self, matches: &ArgMatches) -> anyhow::Result<()> {
        let path = matches
            .get_one::<PathBuf>("plan-file")
            .cloned()
            .unwrap_or_else(|| self.output_dir.join(REVISED_OUTPUT_FILE));
        let document = load_plan_document(&path)
            .with_context(|| format!("failed to read plan document {}", path.display()))?;

        let evaluators = all_evaluators(self.source.clone(), self.judge.clone(), self.model.clone());
        let ctx = EvalContext::new(&document.vacation_info, &document.itinerary)
            .with_feedback(Some(&self.feedback));
        print_results(&run_evaluations(&evaluators, &ctx).await?)
    }

    async fn run_command(&self) -> anyhow::Result<()> {
        let plan = self.initial_plan().await?;
        print_plan("Initial itinerary", &plan)?;
        let initial = self
            .evaluate(&initial_evaluators(self.source.clone(), self.judge.clone()), &plan, None)
            .await?;
        print_results(&initial)?;

        let revised = self.revise(&plan).await?;
        print_plan("Revised itinerary", &revised)?;
        let evaluators = all_evaluators(self.source.clone(), self.judge.clone(), self.model.clone());
        let final_results = self.evaluate(&evaluators, &revised, Some(&self.feedback)).await?;
        print_results(&final_results)
    }

    /// Reuse the saved itinerary when it was planned for this exact request.
    async fn initial_plan(&self) -> anyhow::Result<TravelPlan> {
        let path = self.output_dir.join(OUTPUT_FILE);
        if let Some(plan) = load_reusable_plan(&path, &self.vacation) {
            return Ok(plan);
        }

        let planner = ItineraryPlanner::new(self.model.clone(), self.source.clone());
        let plan = planner.plan(&self.vacation).await?;
        save_plan_document(&path, &PlanDocument::new(self.vacation.clone(), plan.clone()))?;
        Ok(plan)
    }

    async fn revise(&self, plan: &TravelPlan) -> anyhow::Result<TravelPlan> {
        let agent = RevisionAgent::for_vacation(
            self.model.clone(),
            self.dispatcher()?,
            &self.vacation,
            &weather_context(self.source.as_ref(), &self.vacation),
            &self.feedback,
        )
        .with_max_steps(self.max_steps);
        info!(agent = ?agent, "starting revision");

        let result = agent.revise(plan).await?;
        println!("\n{}", result.replay());
        println!("{}", result.explain());

        save_plan_document(
            self.output_dir.join(REVISED_OUTPUT_FILE),
            &PlanDocument::new(self.vacation.clone(), result.plan.clone()),
        )?;
        Ok(result.plan)
    }

    fn dispatcher(&self) -> anyhow::Result<ToolDispatcher> {
        let mut registry = ToolRegistry::new();
        registry.register(CalculatorTool)?;
        registry.register(ActivitiesTool::new(self.source.clone()))?;
        registry.register(WeatherTool::new(self.source.clone()))?;
        registry.register(RunEvalsTool::new(
            self.vacation.clone(),
            Some(self.feedback.clone()),
            all_evaluators(self.source.clone(), self.judge.clone(), self.model.clone()),
        ))?;
        registry.register(FinalAnswerTool)?;
        Ok(ToolDispatcher::new(registry))
    }

    async fn evaluate(
        &self,
        evaluators: &[Box<dyn crate::evals::Evaluator>],
        plan: &TravelPlan,
        feedback: Option<&str>,
    ) -> anyhow::Result<EvaluationResults> {
        let ctx = EvalContext::new(&self.vacation, plan).with_feedback(feedback);
        Ok(run_evaluations(evaluators, &ctx).await?)
    }
}

fn load_vacation(path: &Path) -> anyhow::Result<VacationInfo> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read vacation file {}", path.display()))?;
    let vacation: VacationInfo = serde_json::from_str(&contents)
        .with_context(|| format!("invalid vacation file {}", path.display()))?;
    vacation.validate()?;
    Ok(vacation)
}

fn print_plan(title: &str, plan: &TravelPlan) -> anyhow::Result<()> {
    println!("\n{}:\n{}", title, serde_json::to_string_pretty(plan)?);
    Ok(())
}

fn print_results(results: &EvaluationResults) -> anyhow::Result<()> {
    println!("\nEvaluation results:\n{}", serde_json::to_string_pretty(results)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_definition_is_consistent() {
        command().debug_assert();
    }

    #[test]
    fn test_global_flags_reach_subcommands() {
        let matches = command()
            .try_get_matches_from([
                "itinerary-agent",
                "revise",
                "--max-steps",
                "4",
                "--feedback",
                "more tennis",
            ])
            .unwrap();
        let (name, sub) = matches.subcommand().unwrap();
        assert_eq!(name, "revise");
        assert_eq!(sub.get_one::<usize>("max-steps"), Some(&4));
        assert_eq!(sub.get_one::<String>("feedback").map(String::as_str), Some("more tennis"));
    }

    #[test]
    fn test_load_vacation_rejects_invalid_request() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vacation.json");
        let mut vacation = demo_vacation_info().unwrap();
        vacation.budget = 0;
        std::fs::write(&path, serde_json::to_string(&vacation).unwrap()).unwrap();

        assert!(load_vacation(&path).is_err());
    }
}
