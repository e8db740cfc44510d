mod config;
mod document;
mod init;
mod model;
mod query;
mod report;
mod seed;
mod store;

use anyhow::{Context, Result, bail};
use chrono::{Local, NaiveDateTime};
use clap::{Parser, Subcommand, ValueEnum};
use config::{Config, DEFAULT_CONFIG_FILE};
use document::{DocumentGenerator, GeneratedDocument, format_date_my};
use log::{debug, info};
use model::{Category, DisciplineRecord, RecordInput};
use query::{SortDirection, SortKey, ViewConfig, Window};
use std::fs;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use store::RecordStore;

#[derive(Parser, Debug)]
#[command(author, version, about = "Rekod disiplin murid MTIJ", long_about = None)]
struct Args {
    /// JSON config with school details and form options
    #[arg(short, long, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    /// Record file, overrides the one named in the config
    #[arg(short, long)]
    store: Option<PathBuf>,

    /// Directory for generated documents and backups
    #[arg(short, long, default_value = ".")]
    out: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Record a new case
    Add(RecordFields),
    /// Replace the fields of an existing case
    Edit {
        id: String,
        #[command(flatten)]
        fields: RecordFields,
    },
    Delete {
        id: String,
        #[arg(short, long)]
        yes: bool,
    },
    Show {
        id: String,
    },
    /// Filtered and sorted cases with statistics and demerit totals
    List(ViewArgs),
    /// Print the configured form options
    Options,
    /// Back up every record to a JSON file
    Export,
    /// Merge records from a backup file
    Import {
        file: PathBuf,
        #[arg(short, long)]
        yes: bool,
    },
    /// One-page case summary
    Summary {
        id: String,
    },
    /// Summaries of every listed case in one PDF
    Summaries(ViewArgs),
    /// Individual report with letterhead
    Report {
        id: String,
    },
    /// Warning letter to parents
    Letter {
        id: String,
    },
    /// Landscape table of the listed cases
    Table {
        #[command(flatten)]
        view: ViewArgs,
        /// Write a spreadsheet instead of a PDF
        #[arg(long)]
        xlsx: bool,
    },
    /// Write an empty CSV template for batch entry
    Init {
        file: String,
    },
    /// Add every row of a CSV file
    Batch {
        file: PathBuf,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum CategoryArg {
    Ringan,
    Sederhana,
    Berat,
}

impl From<CategoryArg> for Category {
    fn from(arg: CategoryArg) -> Self {
        match arg {
            CategoryArg::Ringan => Category::Ringan,
            CategoryArg::Sederhana => Category::Sederhana,
            CategoryArg::Berat => Category::Berat,
        }
    }
}

#[derive(clap::Args, Debug)]
struct RecordFields {
    #[arg(long)]
    name: Option<String>,
    #[arg(long)]
    class: Option<String>,
    /// YYYY-MM-DD
    #[arg(long)]
    date: Option<String>,
    /// HH:MM
    #[arg(long)]
    time: Option<String>,
    #[arg(long, value_enum)]
    category: Option<CategoryArg>,
    #[arg(long)]
    violation: Option<String>,
    #[arg(long)]
    location: Option<String>,
    #[arg(long)]
    reporter: Option<String>,
    #[arg(long)]
    action: Option<String>,
    #[arg(long)]
    details: Option<String>,
}

impl RecordFields {
    fn apply_to(self, mut input: RecordInput) -> RecordInput {
        let slots = [
            (self.name, &mut input.student_name),
            (self.class, &mut input.student_class),
            (self.date, &mut input.date),
            (self.time, &mut input.time),
            (self.violation, &mut input.violation_type),
            (self.location, &mut input.location),
            (self.reporter, &mut input.reported_by),
            (self.action, &mut input.action_taken),
            (self.details, &mut input.details),
        ];
        for (value, slot) in slots {
            if let Some(value) = value {
                *slot = value;
            }
        }
        if let Some(category) = self.category {
            input.category = category.into();
        }
        input
    }
}

#[derive(clap::Args, Debug)]
struct ViewArgs {
    /// Case-insensitive part of the student name
    #[arg(long, default_value = "")]
    search: String,
    #[arg(long, value_enum, default_value_t)]
    window: Window,
    #[arg(long, value_enum, default_value_t)]
    sort: SortKey,
    #[arg(long, value_enum, default_value_t)]
    order: SortDirection,
}

impl From<ViewArgs> for ViewConfig {
    fn from(args: ViewArgs) -> Self {
        ViewConfig {
            search: args.search,
            window: args.window,
            sort_key: args.sort,
            direction: args.order,
        }
    }
}

fn now() -> NaiveDateTime {
    Local::now().naive_local()
}

fn confirm(prompt: &str) -> Result<bool> {
    print!("{} [y/N] ", prompt);
    io::stdout().flush()?;
    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer)?;
    Ok(matches!(answer.trim().to_lowercase().as_str(), "y" | "ya" | "yes"))
}

fn find<'a>(store: &'a RecordStore, id: &str) -> Result<&'a DisciplineRecord> {
    match store.get(id) {
        Some(record) => Ok(record),
        None => bail!("rekod {} tidak dijumpai", id),
    }
}

fn save(doc: &GeneratedDocument, out: &Path) -> Result<()> {
    let path = doc.save_in(out)?;
    println!("Dokumen dijana: {}", path.display());
    Ok(())
}

fn print_record(record: &DisciplineRecord) {
    println!("ID Rekod        : {}", record.id);
    println!("Nama Pelajar    : {}", record.student_name);
    println!("Kelas           : {}", record.student_class);
    println!(
        "Tarikh          : {} ({}) {}",
        format_date_my(&record.date),
        record.day,
        record.time
    );
    println!("Kategori        : {}", record.category);
    println!("Jenis Salah Laku: {}", record.violation_type);
    println!("Mata Demerit    : {}", record.demerit);
    println!("Lokasi          : {}", record.location);
    println!("Dilaporkan Oleh : {}", record.reported_by);
    println!("Tindakan        : {}", record.action_taken);
    println!(
        "Butiran         : {}",
        if record.details.is_empty() { "-" } else { &record.details }
    );
}

fn print_list(store: &RecordStore, view: &ViewConfig, now: NaiveDateTime) {
    let result = query::run(store.records(), view, now);
    println!(
        "Kes hari ini: {} | Jumlah kes: {} | Salah laku utama: {}",
        result.stats.today, result.stats.total, result.stats.top_violation
    );
    println!();

    if result.visible.is_empty() {
        println!("Tiada rekod dijumpai.");
    }
    for record in &result.visible {
        println!(
            "{:<11} {:<10} {:<28} {:<16} {:<22} {:>4}  {}",
            record.id,
            format_date_my(&record.date),
            record.student_name,
            record.student_class,
            record.category.label(),
            record.demerit,
            record.violation_type
        );
    }

    if !result.chart.is_empty() {
        println!();
        println!("Mata demerit terkumpul:");
        for entry in &result.chart {
            let bar = "#".repeat((entry.total / 5).max(1) as usize);
            println!("{:<28} {:>4} {}", entry.student_name, entry.total, bar);
        }
    }
}

fn print_options(config: &Config) {
    let lists = [
        ("Pelajar", &config.options.students),
        ("Kelas", &config.options.classes),
        ("Salah laku", &config.options.violations),
        ("Tindakan", &config.options.actions),
        ("Lokasi", &config.options.locations),
    ];
    for (title, values) in lists {
        println!("{}:", title);
        for value in values {
            println!("  - {}", value);
        }
    }
    println!("Kategori:");
    for category in Category::ALL {
        println!("  - {} ({})", category, category.demerit());
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let config = Config::load(&args.config)?;
    let store_path = args.store.clone().unwrap_or_else(|| config.store.clone());

    // commands that never touch the record file
    let command = match args.command {
        Commands::Init { file } => return init::init_csv(&file),
        Commands::Options => {
            print_options(&config);
            return Ok(());
        }
        command => command,
    };

    let mut store = RecordStore::open(&store_path)
        .with_context(|| format!("gagal membuka {}", store_path.display()))?;
    debug!("{} rekod dalam {}", store.records().len(), store.path().display());
    let generator = DocumentGenerator::new(config.school.clone(), config.logo.clone());
    let now = now();
    fs::create_dir_all(&args.out)
        .with_context(|| format!("gagal mencipta {}", args.out.display()))?;

    match command {
        Commands::Add(fields) => {
            let input = fields.apply_to(RecordInput::with_defaults(&config.options, now.date()));
            input.warn_unlisted(&config.options);
            let record = store.add(input)?;
            println!("Rekod disimpan: {}", record.id);
        }
        Commands::Edit { id, fields } => {
            let current = find(&store, &id)?;
            let input = fields.apply_to(RecordInput::from_record(current));
            input.warn_unlisted(&config.options);
            let record = store.update(&id, input)?;
            println!("Rekod dikemas kini: {}", record.id);
        }
        Commands::Delete { id, yes } => {
            find(&store, &id)?;
            if !yes && !confirm(&format!("Padam rekod ini secara kekal? ({})", id))? {
                println!("Dibatalkan.");
                return Ok(());
            }
            let removed = store.delete(&id)?;
            println!("Rekod dipadam: {} ({})", removed.id, removed.student_name);
        }
        Commands::Show { id } => print_record(find(&store, &id)?),
        Commands::List(view) => print_list(&store, &view.into(), now),
        Commands::Export => {
            let path = store.export_to(&args.out, now.date())?;
            println!("Sandaran disimpan: {}", path.display());
        }
        Commands::Import { file, yes } => {
            let content = fs::read_to_string(&file)
                .with_context(|| format!("gagal membaca {}", file.display()))?;
            let imported = store::parse_import(&content)?;
            if !yes && !confirm(&format!("Muat naik {} rekod?", imported.len()))? {
                println!("Dibatalkan.");
                return Ok(());
            }
            let added = store.merge(imported)?;
            println!("{} rekod baharu ditambah.", added);
        }
        Commands::Summary { id } => {
            save(&generator.summary(find(&store, &id)?, now)?, &args.out)?;
        }
        Commands::Summaries(view) => {
            let visible = query::visible_records(store.records(), &view.into(), now);
            save(&generator.summaries(&visible, now)?, &args.out)?;
        }
        Commands::Report { id } => {
            save(&generator.full_report(find(&store, &id)?)?, &args.out)?;
        }
        Commands::Letter { id } => {
            save(&generator.letter(find(&store, &id)?, now)?, &args.out)?;
        }
        Commands::Table { view, xlsx } => {
            let window = view.window;
            let visible = query::visible_records(store.records(), &view.into(), now);
            info!("{} rekod dalam laporan {}", visible.len(), window.report_label());
            let doc = if xlsx {
                report::generate_workbook(&visible, window, now)?
            } else {
                generator.table_report(&visible, window, now)?
            };
            save(&doc, &args.out)?;
        }
        Commands::Batch { file } => {
            let inputs = init::load_batch(&file)?;
            for input in &inputs {
                input.warn_unlisted(&config.options);
            }
            let added = store.add_batch(inputs)?;
            println!("{} rekod ditambah daripada {}", added.len(), file.display());
        }
        Commands::Init { .. } | Commands::Options => {}
    }
    Ok(())
}
