use tokio::io::{AsyncRead, AsyncWrite};

use crate::{
    lottery::{parse_batch, StorageError},
    protocol::{
        framing::{read_message, write_message},
        FramingError, Request, Response,
    },
    SharedLottery,
};

/// Serves one agency connection: exactly one framed request in, exactly one
/// framed response out, then the session ends and the socket is released
///
/// storage failures are reported to the peer as a processing error instead
/// of cutting the exchange short.
pub async fn handle<S>(mut stream: S, lottery: SharedLottery) -> Result<(), FramingError>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let payload = match read_message(&mut stream).await {
        Ok(payload) => payload,
        // connecting and leaving without a request is not a protocol violation
        Err(FramingError::Eof) => return Ok(()),
        Err(err) => return Err(err),
    };

    let request = Request::from_payload(&payload);
    tracing::debug!("received request: {:?}", request);

    let response = match dispatch(request, &lottery).await {
        Ok(response) => response,
        Err(err) => {
            tracing::error!("request failed against the bet store: {}", err);
            Response::ProcessingError
        }
    };
    tracing::debug!("responded: {:?}", response);

    write_message(&mut stream, &response.to_wire()).await
}

async fn dispatch(request: Request, lottery: &SharedLottery) -> Result<Response, StorageError> {
    match request {
        Request::NotifyFinished { agency } => {
            if lottery.barrier.notify(agency) {
                tracing::info!("agency {} completed the quorum, the draw is performed", agency);
            }

            Ok(Response::NotifyAck)
        }
        Request::GetWinners { agency } => {
            if !lottery.barrier.is_drawn() {
                return Ok(Response::DrawPending);
            }

            let documents = lottery
                .store
                .load_all()
                .await?
                .into_iter()
                .filter(|bet| bet.agency == agency && lottery.evaluator.is_winner(bet))
                .map(|bet| bet.document)
                .collect();

            Ok(Response::Winners { documents })
        }
        Request::SubmitBatch { payload } => {
            if lottery.barrier.reject_if_drawn() {
                tracing::warn!("rejected a batch that arrived after the draw");
                return Ok(Response::DrawAlreadyPerformed);
            }

            let bets = match parse_batch(&payload) {
                Ok(bets) => bets,
                Err(err) => {
                    tracing::warn!("rejected a malformed batch: {}", err);
                    return Ok(Response::BatchRejected);
                }
            };

            let amount = bets.len();
            lottery.store.store(bets).await?;
            tracing::info!("stored a batch of {} bets", amount);

            Ok(Response::BatchStored)
        }
    }
}
