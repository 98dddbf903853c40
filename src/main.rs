use map_quiz::cli::Args;
use map_quiz::database_factory::DatabaseFactory;
use map_quiz::quiz_service::QuizService;
use map_quiz::seed::DataSeeder;
use map_quiz::terminal::run_session;
use log::info;
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::io;
use std::sync::Arc;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args = Args::parse_args();
    let config = args.database_config()?;
    info!("Opening database at {}", config.get_path());
    let db = Arc::new(DatabaseFactory::create(config)?);

    if let Some(seed_path) = &args.seed {
        let report = DataSeeder::new(&db).import_file(seed_path)?;
        println!(
            "Imported {} new and {} updated items",
            report.inserted, report.updated
        );
    }

    let rng = match args.rng_seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let mut service = QuizService::new(db, rng);

    let stdin = io::stdin();
    let mut input = stdin.lock();
    let mut output = io::stdout();
    run_session(
        &mut service,
        args.mode.into(),
        args.questions,
        &mut input,
        &mut output,
    )?;

    Ok(())
}
