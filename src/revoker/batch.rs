use std::{num::NonZeroUsize, ops::AddAssign, path::Path, sync::Arc};

use eyre::WrapErr as _;
use tokio::{
    fs::File,
    io::{AsyncBufReadExt as _, BufReader},
    sync::{mpsc, Mutex},
    task::JoinSet,
};

use super::Revoker;
use crate::RevocationReason;

/// Tally of a batch revocation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchReport {
    pub revoked: u64,
    pub failed: u64,
}

impl AddAssign for BatchReport {
    fn add_assign(&mut self, other: Self) {
        self.revoked += other.revoked;
        self.failed += other.failed;
    }
}

impl Revoker {
    /// Revokes every certificate in a file of hex serials, one serial per line.
    ///
    /// Serials are handed to `parallelism` workers through a queue holding at most
    /// `parallelism` serials. Blank lines are skipped. A serial that fails to revoke is logged and
    /// counted but never fails the batch; only opening or reading the file does. Returns once every
    /// serial read has been processed.
    pub async fn revoke_by_serial_batch(
        &self,
        serial_path: impl AsRef<Path>,
        reason: RevocationReason,
        parallelism: NonZeroUsize,
    ) -> eyre::Result<BatchReport> {
        let serial_path = serial_path.as_ref();
        let file = File::open(serial_path)
            .await
            .wrap_err_with(|| format!("failed to open serial file {}", serial_path.display()))?;

        let (work_tx, work_rx) = mpsc::channel::<String>(parallelism.get());
        let work_rx = Arc::new(Mutex::new(work_rx));

        let mut workers = JoinSet::new();
        for _ in 0..parallelism.get() {
            workers.spawn(revoke_worker(self.clone(), Arc::clone(&work_rx), reason));
        }

        let scanned = async {
            let mut lines = BufReader::new(file).lines();

            while let Some(line) = lines.next_line().await? {
                // handle newlines gracefully
                let serial = line.trim();
                if serial.is_empty() {
                    continue;
                }

                if work_tx.send(serial.to_owned()).await.is_err() {
                    // every worker is gone; join below reports why
                    break;
                }
            }

            Ok::<_, std::io::Error>(())
        }
        .await;

        // closing the queue lets workers exit once it is drained
        drop(work_tx);

        let mut report = BatchReport::default();
        while let Some(worker) = workers.join_next().await {
            report += worker.wrap_err("batch revocation worker failed")?;
        }

        scanned.wrap_err_with(|| format!("failed to read serial file {}", serial_path.display()))?;

        log::info!(
            target: "audit",
            "batch revocation from {} finished: {} revoked, {} failed",
            serial_path.display(),
            report.revoked,
            report.failed,
        );

        Ok(report)
    }
}

async fn revoke_worker(
    revoker: Revoker,
    work_rx: Arc<Mutex<mpsc::Receiver<String>>>,
    reason: RevocationReason,
) -> BatchReport {
    let mut report = BatchReport::default();

    loop {
        // the lock is only held while waiting for the next serial
        let Some(serial) = work_rx.lock().await.recv().await else {
            break;
        };

        match revoker.revoke_by_serial(&serial, reason, false).await {
            Ok(()) => report.revoked += 1,
            Err(err) => {
                log::error!("failed to revoke {serial:?}: {err:#}");
                report.failed += 1;
            }
        }
    }

    report
}
