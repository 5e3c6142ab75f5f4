use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use studylock::{
    db,
    models::question::ImportQuestion,
    repositories::{SqliteDailyLogRepository, SqliteQuestionRepository},
    services::quiz_service::QuizService,
};

#[derive(Parser)]
#[command(name = "studylock-cli")]
#[command(about = "CLI tool for managing the studylock question bank", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Question bank commands
    Questions {
        #[command(subcommand)]
        command: QuestionCommands,
    },
}

#[derive(Subcommand)]
enum QuestionCommands {
    /// Import a question file into the bank
    Import {
        /// Path to the JSON question file
        #[arg(short, long)]
        file: PathBuf,

        /// Grade level the questions belong to
        #[arg(short, long)]
        grade: String,

        /// Subject the questions belong to
        #[arg(short, long)]
        subject: String,
    },

    /// Count the questions stored for a grade/subject pair
    Count {
        #[arg(short, long)]
        grade: String,

        #[arg(short, long)]
        subject: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Connect to database
    let pool = db::create_pool().await?;
    sqlx::migrate!("./migrations").run(&pool).await?;

    let quiz_service = QuizService::new(
        Arc::new(SqliteQuestionRepository::new(pool.clone())),
        Arc::new(SqliteDailyLogRepository::new(pool.clone())),
    );

    let cli = Cli::parse();

    match cli.command {
        Commands::Questions { command } => match command {
            QuestionCommands::Import {
                file,
                grade,
                subject,
            } => {
                let raw = std::fs::read_to_string(&file)?;
                let entries: Vec<ImportQuestion> = serde_json::from_str(&raw)?;
                let total = entries.len();

                let outcome = quiz_service.import_questions(entries, &grade, &subject).await?;

                println!(
                    "Imported {} of {} questions into {}/{}",
                    outcome.inserted, total, grade, subject
                );
                if outcome.skipped > 0 {
                    println!(
                        "Skipped {} entries with an out-of-range answer index",
                        outcome.skipped
                    );
                }
            }
            QuestionCommands::Count { grade, subject } => {
                let count = quiz_service.count_questions(&grade, &subject).await?;
                println!("{} questions stored for {}/{}", count, grade, subject);
            }
        },
    }

    Ok(())
}
