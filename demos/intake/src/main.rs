use jobcard::prelude::*;
use jobcard_fs::FileStore;

const DEFAULT_DATA_DIR: &str = "./jobcard-data";
const DATA_DIR: &str = "JOBCARD_DATA_DIR";

#[tokio::main]
pub async fn main() -> Result<(), JobCardError> {
    let data_dir = std::env::var(DATA_DIR).unwrap_or_else(|_| DEFAULT_DATA_DIR.to_owned());
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    let board = JobBoard::open(FileStore::open(&data_dir).await?).await?;
    board
        .save_settings(ShopSettings::new("Corner Fix", "12 Market Street", "0800 111 222"))
        .await?;

    let form = JobForm::default()
        .with_customer_name("Alice")
        .with_customer_phone("98765 43210")
        .with_item_type("Phone")
        .with_item_brand("Nokia")
        .with_item_model("3310")
        .with_issue("Cracked screen")
        .with_accessories("Charger")
        .with_estimate("400")
        .with_tax_percent("18")
        .with_advance("100");
    board.save_draft(&form).await?;
    println!("Preview: {:?}", board.preview(&form));

    let job = board.create_job(form).await?;
    println!("Took in job {job_id}", job_id = job.id);

    board
        .request_status_change(&job.id, JobStatus::InProgress)
        .await?
        .confirm()
        .await?;
    board.jobs().change_status(&job.id, JobStatus::Ready).await?;

    let final_amount = job.breakdown().grand_total;
    let pickup = board
        .request_pickup(&job.id, final_amount, PaymentMode::Upi)
        .await?;
    println!("{}", pickup.prompt());
    pickup.confirm().await?;

    let receipt = board.receipt(&job.id).await?;
    println!("{}", receipt.render(board.currency()));

    for column in board.board(&Where::all()).await.columns {
        println!("{}: {} job(s)", column.status, column.jobs.len());
    }

    let export = board.export().await?;
    let path = std::path::Path::new(&data_dir).join(board.export_file_name());
    std::fs::write(&path, export).map_err(StoreError::from)?;
    println!("Exported board to {}", path.display());

    Ok(())
}
