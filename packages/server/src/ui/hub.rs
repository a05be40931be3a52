//! Hub core: owns the repository and the dispatch table, and drives the
//! connection lifecycle on behalf of the transport loops.

use std::{panic::AssertUnwindSafe, sync::Arc};

use chathub_shared::time::get_jst_timestamp;
use futures_util::FutureExt;
use tokio_util::sync::CancellationToken;
use tracing::Instrument;

use crate::{
    domain::{
        Connection, ConnectionIdFactory, HubRepository, HubSnapshot, OutboundReceiver, Timestamp,
    },
    error::ProtocolError,
    infrastructure::{codec::encode_completion, dto::websocket::InvocationMessage},
    ui::dispatch::{DispatchTable, HubArguments, InvocationContext, InvocationError},
    usecase::{BroadcastUseCase, ConnectClientUseCase, DisconnectClientUseCase, DisconnectError},
};

pub struct Hub {
    repository: Arc<dyn HubRepository>,
    dispatch: DispatchTable,
    shutdown: CancellationToken,
    outbound_capacity: usize,
}

impl Hub {
    pub fn new(
        repository: Arc<dyn HubRepository>,
        dispatch: DispatchTable,
        outbound_capacity: usize,
    ) -> Self {
        Self {
            repository,
            dispatch,
            shutdown: CancellationToken::new(),
            outbound_capacity,
        }
    }

    /// Create the entity for a freshly accepted transport.
    pub fn open_connection(&self) -> (Arc<Connection>, OutboundReceiver) {
        Connection::new(
            ConnectionIdFactory::generate(),
            self.outbound_capacity,
            &self.shutdown,
            Timestamp::new(get_jst_timestamp()),
        )
    }

    /// Register a connection whose handshake was accepted and notify the others.
    pub async fn complete_handshake(&self, connection: &Arc<Connection>) -> Result<(), ProtocolError> {
        let usecase = ConnectClientUseCase::new(self.repository.clone());
        match usecase.execute(connection.clone()).await {
            Ok(notified) => {
                tracing::info!(
                    connection_id = %connection.id(),
                    notified,
                    "Client connected"
                );
                Ok(())
            }
            Err(error) => {
                tracing::debug!(connection_id = %connection.id(), %error, "Registration skipped");
                Err(ProtocolError::RegistrationFailed)
            }
        }
    }

    /// Close a connection. Safe to call any number of times from any task;
    /// only the first call deregisters and notifies.
    pub async fn close_connection(&self, connection: &Connection) {
        if !connection.begin_close() {
            connection.request_close();
            return;
        }

        let usecase = DisconnectClientUseCase::new(self.repository.clone());
        match usecase.execute(connection).await {
            Ok(notified) => {
                tracing::info!(
                    connection_id = %connection.id(),
                    notified,
                    "Client disconnected"
                );
            }
            Err(DisconnectError::NotRegistered(_)) => {
                tracing::debug!(
                    connection_id = %connection.id(),
                    "Connection closed before handshake"
                );
            }
        }
        connection.request_close();
    }

    /// Dispatch one invocation from `connection`.
    ///
    /// Protocol violations are returned and end the connection. Application
    /// errors and panics inside the method are logged, reported through a
    /// completion when the client asked for one, and otherwise swallowed.
    pub async fn invoke(
        &self,
        connection: &Arc<Connection>,
        invocation: InvocationMessage,
    ) -> Result<(), ProtocolError> {
        let InvocationMessage {
            invocation_id,
            target,
            arguments,
        } = invocation;

        let method = self
            .dispatch
            .lookup(&target)
            .ok_or_else(|| ProtocolError::UnknownTarget(target.clone()))?;
        if arguments.len() != method.arity {
            return Err(ProtocolError::ArityMismatch {
                target,
                expected: method.arity,
                actual: arguments.len(),
            });
        }

        let span = tracing::info_span!(
            "hub_invocation",
            transport = "websockets",
            hub_method = method.name,
            connection_id = %connection.id(),
            invocation_id = invocation_id.as_deref().unwrap_or_default(),
        );
        let context = InvocationContext {
            connection: connection.clone(),
            repository: self.repository.clone(),
        };
        let arguments = HubArguments::new(method.name, arguments);

        let reply = async {
            tracing::debug!("Invoking hub method");
            let outcome = AssertUnwindSafe((method.handler)(&context, arguments))
                .catch_unwind()
                .await;
            match outcome {
                Ok(Ok(result)) => Ok(Ok(result)),
                Ok(Err(InvocationError::InvalidArgument { target, index })) => {
                    Err(ProtocolError::InvalidArgument {
                        target: target.to_string(),
                        index,
                        expected: "string",
                    })
                }
                Ok(Err(InvocationError::Room(error))) => {
                    tracing::warn!(%error, "Hub method failed");
                    Ok(Err(error.to_string()))
                }
                Err(_) => {
                    tracing::error!("Hub method panicked");
                    Ok(Err(format!(
                        "An unexpected error occurred invoking '{}' on the server.",
                        method.name
                    )))
                }
            }
        }
        .instrument(span)
        .await?;

        if let Some(id) = invocation_id.as_deref() {
            let completion = match reply {
                Ok(result) => encode_completion(id, Ok(result)),
                Err(error) => encode_completion(id, Err(error.as_str())),
            };
            connection.send(completion);
        }
        Ok(())
    }

    /// Admin broadcast to every connection.
    pub async fn broadcast(&self, message: &str) -> usize {
        let recipients = BroadcastUseCase::new(self.repository.clone())
            .execute(message)
            .await;
        tracing::info!(recipients, "Admin broadcast sent");
        recipients
    }

    pub async fn snapshot(&self) -> HubSnapshot {
        self.repository.snapshot().await
    }

    /// Ask every connection to close.
    pub fn shutdown(&self) {
        self.shutdown.cancel();
    }

    #[cfg(test)]
    pub fn is_shutting_down(&self) -> bool {
        self.shutdown.is_cancelled()
    }
}
