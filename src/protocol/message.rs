use crate::lottery::AgencyId;

pub mod token {
    pub const NOTIFY_FINISHED: &str = "NOTIFY_BETS_FINISHED";
    pub const GET_WINNERS: &str = "GET_WINNERS";
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    /// One or more newline-separated bet lines, kept raw so the batch
    /// parser only runs once the draw gate has been passed
    SubmitBatch { payload: String },
    NotifyFinished { agency: AgencyId },
    GetWinners { agency: AgencyId },
}

impl Request {
    /// Classifies a decoded payload into its request variant
    ///
    /// classification is total: anything that is not a control token
    /// followed by exactly one positive agency id is a batch submission,
    /// and the batch parser decides whether it is acceptable.
    pub fn from_payload(payload: &str) -> Self {
        let trimmed = payload.trim();

        if let Some(agency) = parse_control(trimmed, token::NOTIFY_FINISHED) {
            return Self::NotifyFinished { agency };
        }

        if let Some(agency) = parse_control(trimmed, token::GET_WINNERS) {
            return Self::GetWinners { agency };
        }

        Self::SubmitBatch {
            payload: trimmed.to_owned(),
        }
    }
}

fn parse_control(payload: &str, token: &str) -> Option<AgencyId> {
    let mut parts = payload.split_ascii_whitespace();
    if parts.next() != Some(token) {
        return None;
    }

    let agency: AgencyId = parts.next()?.parse().ok()?;

    // agency ids are positive, and a control message carries nothing else
    if agency == 0 || parts.next().is_some() {
        return None;
    }

    Some(agency)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Response {
    BatchStored,
    BatchRejected,
    DrawAlreadyPerformed,
    DrawPending,
    Winners { documents: Vec<String> },
    NotifyAck,
    ProcessingError,
}

impl Response {
    /// Renders the response as newline-terminated wire text
    pub fn to_wire(&self) -> String {
        match self {
            Self::BatchStored => "batch processed successfully\n".into(),
            Self::BatchRejected => "batch processing failed\n".into(),
            Self::DrawAlreadyPerformed => "draw already performed\n".into(),
            Self::DrawPending => "draw not yet performed\n".into(),
            Self::NotifyAck => "notification acknowledged\n".into(),
            Self::ProcessingError => "processing error\n".into(),
            Self::Winners { documents } => {
                if documents.is_empty() {
                    "no winners for this agency\n".into()
                } else {
                    documents.join("\n") + "\n"
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Request, Response};

    #[test]
    fn classify_control_messages() {
        let payloads = [
            "NOTIFY_BETS_FINISHED 3",
            "GET_WINNERS 1",
            "  NOTIFY_BETS_FINISHED 5\n",
            "GET_WINNERS 127",
        ];

        let expected = [
            Request::NotifyFinished { agency: 3 },
            Request::GetWinners { agency: 1 },
            Request::NotifyFinished { agency: 5 },
            Request::GetWinners { agency: 127 },
        ];

        for (payload, expected) in payloads.into_iter().zip(expected) {
            assert_eq!(Request::from_payload(payload), expected);
        }
    }

    #[test]
    fn classify_batch_submissions() {
        // anything that isn't a well-formed control message is a batch,
        // including control tokens with a missing or malformed agency id
        let payloads = [
            "1,John,Doe,30123456,1990-05-01,7734",
            "1,John,Doe,30123456,1990-05-01,7734\n2,Ana,Ruiz,30234567,1992-02-02,1010",
            "NOTIFY_BETS_FINISHED",
            "NOTIFY_BETS_FINISHED abc",
            "NOTIFY_BETS_FINISHED 0",
            "NOTIFY_BETS_FINISHED -2",
            "GET_WINNERS 1 2",
            "get_winners 1",
            "",
        ];

        for payload in payloads {
            let request = Request::from_payload(payload);
            assert!(
                matches!(request, Request::SubmitBatch { .. }),
                "expected a batch submission for {:?}, received: {:?}",
                payload,
                request
            );
        }
    }

    #[test]
    fn classification_trims_the_payload() {
        let request = Request::from_payload("\n  1,John,Doe,30123456,1990-05-01,7734  \n");
        assert_eq!(
            request,
            Request::SubmitBatch {
                payload: "1,John,Doe,30123456,1990-05-01,7734".into()
            }
        );
    }

    #[test]
    fn responses_render_as_terminated_text() {
        let responses = [
            Response::BatchStored,
            Response::BatchRejected,
            Response::DrawAlreadyPerformed,
            Response::DrawPending,
            Response::NotifyAck,
            Response::ProcessingError,
            Response::Winners { documents: vec![] },
            Response::Winners {
                documents: vec!["30123456".into(), "30234567".into()],
            },
        ];

        let expected = [
            "batch processed successfully\n",
            "batch processing failed\n",
            "draw already performed\n",
            "draw not yet performed\n",
            "notification acknowledged\n",
            "processing error\n",
            "no winners for this agency\n",
            "30123456\n30234567\n",
        ];

        for (response, expected) in responses.iter().zip(expected) {
            assert_eq!(response.to_wire(), expected);
        }
    }
}
