// ==========================================
// 补货控制系统 - 命令行主入口
// ==========================================
// 技术栈: Rust + SQLite + clap
// 系统定位: 7 天周期补货计算与采购清单导出
// ==========================================

use anyhow::{bail, Context};
use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};
use controle_reposicao::api::ApiError;
use controle_reposicao::app::{get_default_db_path, AppState};
use controle_reposicao::config::ReplenishmentConfigReader;
use controle_reposicao::engine::CalculationEngine;
use controle_reposicao::i18n::{t, t_with_args};
use controle_reposicao::report::ReportFormat;
use controle_reposicao::{
    FieldEdit, MarginPercent, ProductField, ProductFilters, ProductForm, ProductRecord, SortField,
    SortOrder, StatusFilter,
};
use std::path::PathBuf;

// ==========================================
// 命令行参数
// ==========================================

#[derive(Parser, Debug)]
#[command(name = "controle-reposicao")]
#[command(about = "Controle de Reposição - cálculo de compras do ciclo de 7 dias")]
#[command(version)]
struct Cli {
    /// Caminho do banco SQLite
    #[arg(long, env = "CONTROLE_REPOSICAO_DB_PATH")]
    db: Option<PathBuf>,

    /// Idioma da saída (pt-BR, en); padrão: configuração salva
    #[arg(long)]
    locale: Option<String>,

    /// Logs em JSON
    #[arg(long)]
    json_logs: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Importa uma planilha e inicia uma nova contagem
    Import {
        file: PathBuf,
        /// Data da contagem (AAAA-MM-DD); padrão: hoje
        #[arg(long)]
        date: Option<NaiveDate>,
        /// Percentual adicional (1-100); padrão: configuração
        #[arg(long)]
        margin: Option<i32>,
        /// Apenas mostra o que seria importado
        #[arg(long)]
        dry_run: bool,
    },
    /// Lista os produtos da contagem atual
    List {
        #[arg(long, default_value = "")]
        search: String,
        #[arg(long, value_enum, default_value_t = StatusArg::All)]
        status: StatusArg,
        #[arg(long, value_enum, default_value_t = SortArg::Name)]
        sort: SortArg,
        #[arg(long)]
        desc: bool,
        #[arg(long, default_value_t = 1)]
        page: usize,
        /// Saída em JSON
        #[arg(long)]
        json: bool,
    },
    /// Adiciona um produto
    Add {
        name: String,
        #[arg(long, default_value_t = 0.0)]
        prior: f64,
        #[arg(long, default_value_t = 0.0)]
        current: f64,
        #[arg(long, default_value_t = 0.0)]
        sales: f64,
        #[arg(long)]
        margin: Option<i32>,
    },
    /// Altera um campo de um produto
    Edit {
        id: i64,
        /// nome | saldo_anterior | saldo_atual | vendas | percentual_adicional
        field: String,
        value: String,
    },
    /// Exclui um produto
    Delete { id: i64 },
    /// Exclui todos os produtos (nova contagem)
    NewCount {
        /// Confirma a exclusão
        #[arg(long)]
        yes: bool,
    },
    /// Resumo da contagem
    Summary,
    /// Exporta o relatório de compras
    Report {
        #[arg(long, value_enum, default_value_t = FormatArg::Html)]
        format: FormatArg,
        /// Diretório de saída
        #[arg(long, default_value = ".")]
        output: PathBuf,
    },
    /// Configuração
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigAction {
    /// Mostra a configuração efetiva
    Show,
    /// Altera um valor
    Set { key: String, value: String },
}

#[derive(ValueEnum, Debug, Clone, Copy)]
enum StatusArg {
    All,
    Buy,
    Enough,
}

#[derive(ValueEnum, Debug, Clone, Copy)]
enum SortArg {
    Name,
    Difference,
    Purchase,
}

#[derive(ValueEnum, Debug, Clone, Copy)]
enum FormatArg {
    Html,
    Csv,
    Json,
}

impl From<StatusArg> for StatusFilter {
    fn from(arg: StatusArg) -> Self {
        match arg {
            StatusArg::All => StatusFilter::All,
            StatusArg::Buy => StatusFilter::NeedsPurchase,
            StatusArg::Enough => StatusFilter::Sufficient,
        }
    }
}

impl From<SortArg> for SortField {
    fn from(arg: SortArg) -> Self {
        match arg {
            SortArg::Name => SortField::Name,
            SortArg::Difference => SortField::Difference,
            SortArg::Purchase => SortField::PurchaseQuantity,
        }
    }
}

impl From<FormatArg> for ReportFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Html => ReportFormat::Html,
            FormatArg::Csv => ReportFormat::Csv,
            FormatArg::Json => ReportFormat::Json,
        }
    }
}

// ==========================================
// 主流程
// ==========================================

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // 初始化日志系统
    if cli.json_logs {
        controle_reposicao::logging::init_json();
    } else {
        controle_reposicao::logging::init();
    }

    if let Err(err) = run(cli).await {
        report_error(&err);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let db_path = cli
        .db
        .map(|p| p.to_string_lossy().to_string())
        .unwrap_or_else(get_default_db_path);
    tracing::debug!(db_path = %db_path, version = controle_reposicao::VERSION, "启动");

    let state = AppState::new(db_path).map_err(anyhow::Error::msg)?;
    match cli.locale {
        Some(locale) => controle_reposicao::i18n::set_locale(&locale),
        None => {
            state.apply_locale_from_config().await.map_err(anyhow::Error::msg)?;
        }
    }

    let engine = CalculationEngine::new();

    match cli.command {
        Command::Import {
            file,
            date,
            margin,
            dry_run,
        } => {
            let file = file.to_string_lossy().to_string();
            if dry_run {
                let parsed = state.import_api.preview(&file).await?;
                println!("Layout: {}", parsed.layout);
                for row in &parsed.rows {
                    println!("  [{}] {}", row.row_number, row.name);
                }
                print_skipped(&parsed.skipped);
                return Ok(());
            }

            let margin = margin.map(MarginPercent::new).transpose()?;
            let mut workspace = state.open_workspace().await?;
            let response = workspace.new_count(&file, date, margin).await?;
            println!(
                "{}",
                t_with_args("import.completed", &[("count", &response.imported.to_string())])
            );
            print_skipped(&response.skipped);
            print_summary(&workspace.summary());
        }

        Command::List {
            search,
            status,
            sort,
            desc,
            page,
            json,
        } => {
            let mut workspace = state.open_workspace().await?;
            workspace.set_filters(ProductFilters {
                search,
                status: status.into(),
                sort_by: sort.into(),
                sort_order: if desc { SortOrder::Desc } else { SortOrder::Asc },
            });
            workspace.set_page(page);
            let view = workspace.view();

            if json {
                println!("{}", serde_json::to_string_pretty(&view)?);
            } else {
                for product in &view.items {
                    print_product(&engine, product);
                }
                println!("-- {}/{} ({})", view.page, view.total_pages.max(1), view.total_items);
            }
        }

        Command::Add {
            name,
            prior,
            current,
            sales,
            margin,
        } => {
            let default_margin = state
                .config_manager
                .get_default_margin()
                .await
                .map_err(|e| anyhow::anyhow!(e.to_string()))?
                .value();
            let form = ProductForm {
                name,
                prior_balance: Some(prior),
                current_balance: Some(current),
                sales_volume: Some(sales),
                additional_percent_margin: Some(margin.unwrap_or(default_margin)),
            };
            let mut workspace = state.open_workspace().await?;
            let saved = workspace.add_product(&form)?;
            println!("{}", t("product.created"));
            print_product(&engine, &saved);
        }

        Command::Edit { id, field, value } => {
            let Some(field) = ProductField::from_key(&field) else {
                bail!("campo desconhecido: {}", field);
            };
            let edit = build_edit(&engine, field, &value)?;
            let mut workspace = state.open_workspace().await?;
            let saved = workspace.apply_edit(id, edit)?;
            println!("{}", t("product.updated"));
            print_product(&engine, &saved);
        }

        Command::Delete { id } => {
            let mut workspace = state.open_workspace().await?;
            workspace.delete(id)?;
            println!("{}", t("product.deleted"));
        }

        Command::NewCount { yes } => {
            if !yes {
                bail!("use --yes para confirmar a exclusão de todos os produtos");
            }
            let mut workspace = state.open_workspace().await?;
            workspace.clear()?;
            println!("{}", t("product.cleared"));
        }

        Command::Summary => {
            let workspace = state.open_workspace().await?;
            print_summary(&workspace.summary());
        }

        Command::Report { format, output } => {
            let path = state.report_api.export(format.into(), &output).await?;
            println!(
                "{}",
                t_with_args("report.exported", &[("path", &path.display().to_string())])
            );
        }

        Command::Config { action } => match action {
            ConfigAction::Show => {
                let config = state
                    .config_manager
                    .effective_config()
                    .map_err(|e| anyhow::anyhow!(e.to_string()))?;
                for (key, value) in config {
                    println!("{} = {}", key, value);
                }
            }
            ConfigAction::Set { key, value } => {
                state
                    .config_manager
                    .set_global_config_value(&key, &value)
                    .map_err(|e| anyhow::anyhow!(e.to_string()))
                    .with_context(|| format!("config {}", key))?;
                println!("{} = {}", key, value.trim());
            }
        },
    }

    Ok(())
}

// ==========================================
// 输出辅助
// ==========================================

fn build_edit(engine: &CalculationEngine, field: ProductField, value: &str) -> anyhow::Result<FieldEdit> {
    let edit = match field {
        ProductField::Name => FieldEdit::Name(value.to_string()),
        ProductField::PriorBalance => FieldEdit::PriorBalance(engine.parse_quantity(value)?),
        ProductField::CurrentBalance => FieldEdit::CurrentBalance(engine.parse_quantity(value)?),
        ProductField::SalesVolume => FieldEdit::SalesVolume(engine.parse_quantity(value)?),
        ProductField::AdditionalPercentMargin => {
            let trimmed = value.trim();
            let margin = if trimmed.is_empty() {
                None
            } else {
                Some(trimmed.parse::<i32>().context("percentual inválido")?)
            };
            FieldEdit::AdditionalPercentMargin(margin)
        }
    };
    Ok(edit)
}

fn print_product(engine: &CalculationEngine, product: &ProductRecord) {
    let with_margin = product
        .purchase_with_margin
        .map(|q| engine.format_quantity(q))
        .unwrap_or_else(|| "-".to_string());
    println!(
        "{:>5}  {:<30} {:>10} {:>10} {:>10} {:>10} {:>10} {:>10} {:>5}  {}",
        product.id.map(|id| id.to_string()).unwrap_or_default(),
        product.name,
        engine.format_quantity(product.prior_balance),
        engine.format_quantity(product.current_balance),
        engine.format_quantity(product.sales_volume),
        engine.format_quantity(product.difference),
        engine.format_quantity(product.purchase_quantity),
        with_margin,
        product.additional_percent_margin,
        engine.status_of(product.purchase_quantity),
    );
}

fn print_summary(summary: &controle_reposicao::CountSummary) {
    println!("{}: {}", t("summary.total"), summary.total_products);
    println!("{}: {}", t("summary.needs_purchase"), summary.needs_purchase);
    println!("{}: {}", t("summary.sufficient"), summary.sufficient);
}

fn print_skipped(skipped: &[controle_reposicao::domain::SkippedRow]) {
    for row in skipped {
        eprintln!(
            "  ! [{}] {} - {}",
            row.row_number,
            row.name.as_deref().unwrap_or(""),
            row.reason
        );
    }
}

fn report_error(err: &anyhow::Error) {
    match err.downcast_ref::<ApiError>() {
        Some(ApiError::ValidationFailed { violations, .. }) => {
            for violation in violations {
                eprintln!("{}", violation);
            }
        }
        Some(ApiError::NothingToPurchase) => eprintln!("{}", t("report.nothing_to_purchase")),
        _ => eprintln!("{:#}", err),
    }
}
