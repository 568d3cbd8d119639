use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand, ValueEnum};
use crm_core::{
    config::{CrmConfig, CONFIG_FILE},
    domain::{
        build_columns, sort_records, sort_tasks, sorting::PipelineFields, BoardConfig, Contact,
        LeadStage, RecordId, SortField, SortOrder, Task, TaskSortField,
    },
    remote::{RemoteStore, Table},
    reports::{ContactDetails, DashboardStats, Reports},
    Completion, PipelineBoard, RecordCollection,
};
use std::{path::PathBuf, sync::Arc};

#[derive(Parser)]
#[command(name = "crm")]
#[command(about = "Contacts, pipelines and tasks from the command line", long_about = None)]
struct Cli {
    /// Configuration file
    #[arg(long, global = true, default_value = CONFIG_FILE)]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum BoardKind {
    Leads,
    Deals,
}

#[derive(Clone, Copy, ValueEnum)]
enum ReportKind {
    Team,
    Conversion,
}

#[derive(Subcommand)]
enum Commands {
    /// Show a pipeline board, one column per stage
    Board {
        #[arg(value_enum)]
        board: BoardKind,
        /// Sort cards within columns (id, name, value, stage, score)
        #[arg(long)]
        sort: Option<SortField>,
        /// Sort direction (asc, desc)
        #[arg(long, default_value = "asc")]
        order: SortOrder,
    },
    /// Move a lead or deal to another stage
    Move {
        #[arg(value_enum)]
        board: BoardKind,
        id: RecordId,
        stage: LeadStage,
    },
    /// Headline numbers and upcoming tasks
    Dashboard,
    /// Team performance or lead conversion
    Report {
        #[arg(value_enum)]
        kind: ReportKind,
    },
    /// List contacts, optionally filtered by name, email or company
    Contacts { term: Option<String> },
    /// Show a contact with its deals and tasks
    Contact { id: RecordId },
    /// List tasks
    Tasks {
        /// Sort by due, priority or title
        #[arg(long, default_value = "due")]
        sort: TaskSortField,
        #[arg(long, default_value = "asc")]
        order: SortOrder,
    },
    /// Mark a task completed, or pending again
    Toggle { id: RecordId },
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let config = CrmConfig::load(&cli.config)
        .with_context(|| format!("Failed to read {}", cli.config.display()))?;
    let remote = config.connect().await.context("Failed to open the backend")?;

    match cli.command {
        Commands::Board { board, sort, order } => match board {
            BoardKind::Leads => {
                let mut board = PipelineBoard::leads(remote, config.owner.clone());
                board.load().await?;
                print_board(board.records().store().to_vec(), board.config(), sort, order);
            }
            BoardKind::Deals => {
                let mut board = PipelineBoard::deals(remote, config.owner.clone());
                board.load().await?;
                print_board(board.records().store().to_vec(), board.config(), sort, order);
            }
        },
        Commands::Move { board, id, stage } => {
            let completion = match board {
                BoardKind::Leads => {
                    let mut board = PipelineBoard::leads(remote, config.owner.clone());
                    board.load().await?;
                    board.move_record(id, stage).await?
                }
                BoardKind::Deals => {
                    let mut board = PipelineBoard::deals(remote, config.owner.clone());
                    board.load().await?;
                    board.move_record(id, stage).await?
                }
            };
            match completion {
                Some(Completion::Applied) => println!("Moved {} to {}", id, stage),
                Some(other) => println!("Move of {} finished as {:?}", id, other),
                None => println!("{} is already in {}", id, stage),
            }
        }
        Commands::Dashboard => print_dashboard(&DashboardStats::load(remote.as_ref()).await?),
        Commands::Report { kind } => {
            let reports = Reports::load(remote.as_ref()).await?;
            match kind {
                ReportKind::Team => {
                    for member in &reports.team {
                        println!(
                            "{:<24} {:>4} deals  {:>12.2}",
                            member.name, member.deals, member.revenue
                        );
                    }
                }
                ReportKind::Conversion => {
                    let c = reports.conversion;
                    println!("Won:         {}", c.won);
                    println!("Lost:        {}", c.lost);
                    println!("In Progress: {}", c.in_progress);
                }
            }
        }
        Commands::Contacts { term } => {
            let contacts = collection::<Contact>(Table::Contacts, remote, &config).await?;
            let found = contacts.search(term.as_deref().unwrap_or(""));
            for contact in found {
                println!(
                    "{:>6}  {:<24} {:<32} {}",
                    contact.id, contact.name, contact.email, contact.company
                );
            }
        }
        Commands::Contact { id } => {
            let details = ContactDetails::load(remote.as_ref(), id).await?;
            print_contact(&details);
        }
        Commands::Tasks { sort, order } => {
            let tasks = collection::<Task>(Table::Tasks, remote, &config).await?;
            let mut tasks = tasks.store().to_vec();
            sort_tasks(&mut tasks, sort, order);
            for task in &tasks {
                print_task(task);
            }
        }
        Commands::Toggle { id } => {
            let mut tasks = collection::<Task>(Table::Tasks, remote, &config).await?;
            tasks.toggle_status(id).await?;
            if let Some(task) = tasks.store().get(id) {
                print_task(task);
            }
        }
    }

    Ok(())
}

async fn collection<R>(
    table: Table,
    remote: Arc<dyn RemoteStore>,
    config: &CrmConfig,
) -> Result<RecordCollection<R>>
where
    R: crm_core::domain::Editable + serde::de::DeserializeOwned,
{
    let mut records = RecordCollection::new(table, remote, config.owner.clone());
    records.load().await?;
    Ok(records)
}

fn print_board<R: PipelineFields>(
    mut records: Vec<R>,
    config: &BoardConfig,
    sort: Option<SortField>,
    order: SortOrder,
) {
    if let Some(field) = sort {
        sort_records(&mut records, field, order);
    }

    let view = build_columns(&records, config);
    for column in &view.columns {
        println!("{} ({})", column.label, column.len());
        for record in &column.items {
            println!("  {:>6}  {:<32} {:>12.2}", record.id(), record.name(), record.value());
        }
    }
    if !view.unplaced.is_empty() {
        println!("Not on this board: {}", view.unplaced.len());
    }
}

fn print_dashboard(stats: &DashboardStats) {
    println!("Total revenue: {:.2}", stats.total_revenue);
    println!("New leads:     {}", stats.new_leads);
    println!("Deals won:     {}", stats.deals_won);
    println!("Open tasks:    {}", stats.open_tasks);

    println!("\nLead sources");
    for source in &stats.lead_sources {
        println!("  {:<20} {}", source.source, source.count);
    }

    println!("\nUpcoming tasks");
    for task in &stats.upcoming {
        print_task(task);
    }
}

fn print_contact(details: &ContactDetails) {
    let contact = &details.contact;
    println!("{} <{}>", contact.name, contact.email);
    if !contact.company.is_empty() {
        println!("Company: {}", contact.company);
    }
    if !contact.phone.is_empty() {
        println!("Phone:   {}", contact.phone);
    }
    if !contact.tags.is_empty() {
        println!("Tags:    {}", contact.tags.join(", "));
    }

    println!("\nDeals ({:.2})", details.pipeline_value());
    for deal in &details.deals {
        println!("  {:>6}  {:<32} {:<12} {:>12.2}", deal.id, deal.name, deal.stage, deal.value);
    }

    println!("\nTasks");
    for task in &details.tasks {
        print_task(task);
    }
}

fn print_task(task: &Task) {
    let flag = if task.is_overdue(Utc::now()) { "!" } else { " " };
    println!(
        "  {:>6} {}{}  {:<6} {:<12} {}",
        task.id,
        flag,
        task.due_date.format("%Y-%m-%d"),
        task.priority,
        task.status,
        task.title
    );
}
