use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::action::Action;
use crate::error::Result;
use crate::forge::Forge;
use crate::section::RefreshTicket;
use crate::types::{ListMergeRequestsOptions, MergeRequest};

/// Most recently updated first. Ties keep their fetch order.
pub fn sort_by_recent(requests: &mut [MergeRequest]) {
    requests.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
}

/// One fetch, ordered for display.
pub async fn fetch_sorted(
    forge: &dyn Forge,
    opts: &ListMergeRequestsOptions,
) -> Result<Vec<MergeRequest>> {
    let mut requests = forge.list_merge_requests(opts).await?;
    sort_by_recent(&mut requests);
    Ok(requests)
}

/// Build the function a section calls on refresh. Each call spawns one
/// fetch and reports back on `tx` with the ticket it was given.
pub fn refresh_fn(
    forge: Arc<dyn Forge>,
    opts: ListMergeRequestsOptions,
    tx: mpsc::UnboundedSender<Action>,
) -> impl FnMut(RefreshTicket) + 'static {
    move |ticket: RefreshTicket| {
        let forge = Arc::clone(&forge);
        let opts = opts.clone();
        let tx = tx.clone();
        tokio::spawn(async move {
            let result = match fetch_sorted(forge.as_ref(), &opts).await {
                Ok(requests) => {
                    debug!(
                        forge = forge.name(),
                        section = %ticket.section,
                        count = requests.len(),
                        "merge requests fetched"
                    );
                    Ok(requests)
                }
                Err(e) => {
                    warn!(forge = forge.name(), section = %ticket.section, error = %e, "fetch failed");
                    Err(e.to_string())
                }
            };
            tx.send(Action::MergeRequestsLoaded {
                section: ticket.section,
                load_id: ticket.load_id,
                result,
            })
            .ok();
        });
    }
}
