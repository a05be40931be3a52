//! Client-invocable hub methods.
//!
//! Each method unpacks its positional arguments and hands off to a use case.

use futures_util::future::BoxFuture;

use crate::{
    infrastructure::dto::websocket::{JOIN_ROOM, LEAVE_ROOM, SEND_MESSAGE, SEND_MESSAGE_TO_ROOM},
    ui::dispatch::{DispatchTable, HubArguments, InvocationContext, InvocationResult},
    usecase::{JoinRoomUseCase, LeaveRoomUseCase, SendMessageToRoomUseCase, SendMessageUseCase},
};

/// The table every connection dispatches through.
pub fn builtin_dispatch_table() -> DispatchTable {
    let mut table = DispatchTable::new();
    table.register(SEND_MESSAGE, 2, send_message);
    table.register(JOIN_ROOM, 1, join_room);
    table.register(LEAVE_ROOM, 1, leave_room);
    table.register(SEND_MESSAGE_TO_ROOM, 3, send_message_to_room);
    table
}

/// `SendMessage(displayName, text)`
fn send_message<'a>(
    context: &'a InvocationContext,
    arguments: HubArguments,
) -> BoxFuture<'a, InvocationResult> {
    Box::pin(async move {
        let display_name = arguments.string(0)?;
        let text = arguments.string(1)?;
        SendMessageUseCase::new(context.repository.clone())
            .execute(display_name, text)
            .await;
        Ok(None)
    })
}

/// `JoinRoom(groupName)`
fn join_room<'a>(
    context: &'a InvocationContext,
    arguments: HubArguments,
) -> BoxFuture<'a, InvocationResult> {
    Box::pin(async move {
        let group = arguments.string(0)?.to_string();
        JoinRoomUseCase::new(context.repository.clone())
            .execute(context.connection.id(), group)
            .await?;
        Ok(None)
    })
}

/// `LeaveRoom(groupName)`
fn leave_room<'a>(
    context: &'a InvocationContext,
    arguments: HubArguments,
) -> BoxFuture<'a, InvocationResult> {
    Box::pin(async move {
        let group = arguments.string(0)?.to_string();
        LeaveRoomUseCase::new(context.repository.clone())
            .execute(context.connection.id(), group)
            .await?;
        Ok(None)
    })
}

/// `SendMessageToRoom(groupName, displayName, text)`
fn send_message_to_room<'a>(
    context: &'a InvocationContext,
    arguments: HubArguments,
) -> BoxFuture<'a, InvocationResult> {
    Box::pin(async move {
        let group = arguments.string(0)?.to_string();
        let display_name = arguments.string(1)?;
        let text = arguments.string(2)?;
        SendMessageToRoomUseCase::new(context.repository.clone())
            .execute(group, display_name, text)
            .await?;
        Ok(None)
    })
}
