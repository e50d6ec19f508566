//! Per-connection dispatcher: reads client events, resolves the owning
//! table through the lobby, invokes the table operation, and fans the
//! outcome back out through the broadcast layer.
//!
//! Rejection is silent: a turn operation that loses the guard race or
//! fails its state check produces no broadcast at all, and clients
//! read the absence of a result event as "action rejected". Only
//! capacity errors (a failed join, a refused create) get an explicit
//! reply to the requester.

use std::collections::HashSet;
use std::sync::Arc;

use tilehall_protocol::{
    ClientEvent, Codec, HandSubmission, ServerEvent, TableId, SEATS,
};
use tilehall_table::Table;
use tilehall_transport::{ClientId, Connection, WebSocketConnection};
use tokio::sync::mpsc;

use crate::server::ServerState;
use crate::ServerError;

/// Handles one connection from accept to close.
pub(crate) async fn handle_connection(
    conn: WebSocketConnection,
    state: Arc<ServerState>,
) {
    let client = conn.id();
    let conn = Arc::new(conn);

    // Register the outbound queue and its writer task. The writer is
    // the only place that touches the socket for sends, so broadcasts
    // never block a dispatcher on a slow peer.
    let (tx, mut rx) = mpsc::unbounded_channel::<Vec<u8>>();
    state.peers.lock().await.insert(client, tx);
    let writer = {
        let conn = Arc::clone(&conn);
        tokio::spawn(async move {
            while let Some(bytes) = rx.recv().await {
                if conn.send(&bytes).await.is_err() {
                    break;
                }
            }
        })
    };

    loop {
        match conn.recv().await {
            Ok(Some(data)) => {
                let event: ClientEvent = match state.codec.decode(&data) {
                    Ok(event) => event,
                    Err(e) => {
                        tracing::debug!(
                            %client,
                            error = %e,
                            "undecodable frame, skipping"
                        );
                        continue;
                    }
                };
                if let Err(e) = dispatch(client, event, &state).await {
                    tracing::debug!(%client, error = %e, "dispatch failed");
                }
            }
            Ok(None) => {
                tracing::info!(%client, "connection closed");
                break;
            }
            Err(e) => {
                tracing::debug!(%client, error = %e, "recv error");
                break;
            }
        }
    }

    handle_disconnect(client, &state).await;
    state.peers.lock().await.remove(&client);
    writer.abort();
}

/// Routes one decoded event to its table or lobby operation.
async fn dispatch(
    client: ClientId,
    event: ClientEvent,
    state: &Arc<ServerState>,
) -> Result<(), ServerError> {
    match event {
        ClientEvent::CreateTable => {
            let created = state.lobby.lock().await.create_table();
            match created {
                Some(id) => {
                    tracing::info!(%client, table = %id, "table created");
                    broadcast_lobby(state).await?;
                }
                None => {
                    // The newest table is still empty — point the
                    // requester at the current listing instead.
                    send_to(state, client, &ServerEvent::NotCreated).await?;
                    let tables = state.lobby.lock().await.summaries();
                    send_to(state, client, &ServerEvent::TableList { tables })
                        .await?;
                }
            }
        }

        ClientEvent::JoinTable { table: id } => {
            let table = state.lobby.lock().await.table(id);
            let seat = match &table {
                Some(table) => match table.join(client) {
                    Ok(seat) => {
                        state.lobby.lock().await.bind_client(client, id);
                        Some(seat)
                    }
                    Err(e) => {
                        tracing::debug!(
                            %client, table = %id, error = %e, "join refused"
                        );
                        None
                    }
                },
                None => None,
            };

            send_to(state, client, &ServerEvent::JoinResult { seat }).await?;
            broadcast_lobby(state).await?;

            // The fourth join arms the single-use start gate; exactly
            // one racing caller observes true and runs the handshake.
            if let Some(table) = table {
                if table.can_start() {
                    begin_start_handshake(state, &table).await?;
                }
            }
        }

        ClientEvent::ListTables => {
            let tables = state.lobby.lock().await.summaries();
            send_to(state, client, &ServerEvent::TableList { tables }).await?;
        }

        ClientEvent::StartAck => {
            handle_start_ack(client, state).await?;
        }

        ClientEvent::Drop { tile } => {
            if let Some(table) = table_of(state, client).await {
                match table.discard() {
                    Ok(()) => {
                        broadcast_table(
                            state,
                            &table,
                            &ServerEvent::DropResult { tile },
                        )
                        .await?;
                    }
                    Err(e) => {
                        tracing::debug!(%client, error = %e, "drop rejected");
                    }
                }
            }
        }

        ClientEvent::Draw { seat } => {
            if let Some(table) = table_of(state, client).await {
                match table.draw(seat) {
                    Ok(tile) => {
                        broadcast_table(
                            state,
                            &table,
                            &ServerEvent::DrawResult { tile },
                        )
                        .await?;
                    }
                    Err(e) => {
                        tracing::debug!(
                            %client, %seat, error = %e, "draw rejected"
                        );
                    }
                }
            }
        }

        ClientEvent::ClaimCombo {
            key,
            seat,
            added_tile,
            is_kong,
        } => {
            if let Some(table) = table_of(state, client).await {
                match table.claim_combo(seat, is_kong) {
                    Ok(()) => {
                        broadcast_table(
                            state,
                            &table,
                            &ServerEvent::ComboResult {
                                key,
                                seat,
                                added_tile,
                            },
                        )
                        .await?;
                    }
                    Err(e) => {
                        tracing::debug!(
                            %client, %seat, error = %e, "combo claim rejected"
                        );
                    }
                }
            }
        }

        ClientEvent::DeclareChi { seat } => {
            if let Some(table) = table_of(state, client).await {
                match table.declare_chi(seat) {
                    Ok(()) => {
                        broadcast_table(state, &table, &ServerEvent::ChiResult)
                            .await?;
                    }
                    Err(e) => {
                        tracing::debug!(
                            %client, %seat, error = %e, "chi rejected"
                        );
                    }
                }
            }
        }

        ClientEvent::DeclareConcealedKong { seat } => {
            if let Some(table) = table_of(state, client).await {
                match table.declare_concealed_kong(seat) {
                    Ok(()) => {
                        broadcast_table(
                            state,
                            &table,
                            &ServerEvent::HiddenKongResult,
                        )
                        .await?;
                    }
                    Err(e) => {
                        tracing::debug!(
                            %client, %seat, error = %e, "concealed kong rejected"
                        );
                    }
                }
            }
        }

        ClientEvent::DeclareWin { seat, combos } => {
            if let Some(table) = table_of(state, client).await {
                match table.declare_win(seat) {
                    Ok(()) => {
                        broadcast_table(
                            state,
                            &table,
                            &ServerEvent::WinResult { seat, combos },
                        )
                        .await?;
                    }
                    Err(e) => {
                        tracing::debug!(
                            %client, %seat, error = %e, "win rejected"
                        );
                    }
                }
            }
        }

        ClientEvent::SubmitHand {
            seat,
            tiles,
            combos,
        } => {
            if let Some(table) = table_of(state, client).await {
                let submission = HandSubmission { tiles, combos };
                if let Some(hands) = table.submit_hand(seat, submission) {
                    tracing::info!(
                        table = %table.id(),
                        "all hands submitted"
                    );
                    broadcast_table(
                        state,
                        &table,
                        &ServerEvent::HandsCollected { hands },
                    )
                    .await?;
                }
            }
        }

        ClientEvent::ResetSeat => {
            if let Some(table) = table_of(state, client).await {
                if !table.is_started() {
                    table.leave(client);
                    state.lobby.lock().await.unbind_client(client);
                    broadcast_lobby(state).await?;
                }
            }
            send_to(state, client, &ServerEvent::ResetAck).await?;
        }

        ClientEvent::RestartRound => {
            if let Some(table) = table_of(state, client).await {
                if table.is_started() {
                    let round = table.deal();
                    broadcast_table(
                        state,
                        &table,
                        &ServerEvent::Start {
                            hands: round.hands,
                            starting_seat: round.starting_seat,
                        },
                    )
                    .await?;
                }
            }
        }
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Start handshake
// ---------------------------------------------------------------------------

/// Announces the imminent deal to all four occupants and arms the
/// acknowledgment timeout. The deal itself is held until every seat
/// replies `startAck` — this replaces a fixed pre-deal sleep, so the
/// start broadcast can never overtake the final join acknowledgment.
async fn begin_start_handshake(
    state: &Arc<ServerState>,
    table: &Arc<Table>,
) -> Result<(), ServerError> {
    let id = table.id();
    state
        .pending_starts
        .lock()
        .await
        .insert(id, HashSet::new());
    broadcast_table(state, table, &ServerEvent::StartPending).await?;
    tracing::info!(table = %id, "table full, awaiting start acknowledgments");

    // Missing acknowledgments are a hard failure: tear the table down
    // rather than dealing into a half-listening room.
    let state = Arc::clone(state);
    tokio::spawn(async move {
        tokio::time::sleep(state.start_ack_timeout).await;
        let timed_out =
            state.pending_starts.lock().await.remove(&id).is_some();
        if timed_out {
            tracing::warn!(
                table = %id,
                "start acknowledgment timed out, terminating table"
            );
            if let Err(e) = terminate_table(&state, id, None).await {
                tracing::debug!(error = %e, "termination broadcast failed");
            }
        }
    });
    Ok(())
}

/// Records one seat's acknowledgment; the fourth one releases the deal.
async fn handle_start_ack(
    client: ClientId,
    state: &Arc<ServerState>,
) -> Result<(), ServerError> {
    let Some(table) = table_of(state, client).await else {
        return Ok(());
    };
    let Some(seat) = table.seat_of(client) else {
        return Ok(());
    };
    let id = table.id();

    let complete = {
        let mut pending = state.pending_starts.lock().await;
        let complete = match pending.get_mut(&id) {
            Some(acked) => {
                acked.insert(seat);
                acked.len() == SEATS
            }
            // No pending entry: stale ack (already dealt or timed out).
            None => false,
        };
        if complete {
            pending.remove(&id);
        }
        complete
    };

    if complete {
        let round = table.deal();
        tracing::info!(
            table = %id,
            starting_seat = %round.starting_seat,
            "all seats acknowledged, dealing"
        );
        broadcast_table(
            state,
            &table,
            &ServerEvent::Start {
                hands: round.hands,
                starting_seat: round.starting_seat,
            },
        )
        .await?;
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Disconnects and teardown
// ---------------------------------------------------------------------------

/// Applies the disconnect policy: pre-start, the seat is freed and the
/// table survives; mid-game, the whole table is torn down. There is no
/// reconnection.
async fn handle_disconnect(client: ClientId, state: &Arc<ServerState>) {
    let Some(table) = table_of(state, client).await else {
        return;
    };

    if table.is_started() {
        tracing::info!(
            %client,
            table = %table.id(),
            "occupant disconnected mid-game, terminating table"
        );
        if let Err(e) = terminate_table(state, table.id(), Some(client)).await
        {
            tracing::debug!(error = %e, "termination broadcast failed");
        }
    } else {
        table.leave(client);
        state.lobby.lock().await.unbind_client(client);
        if let Err(e) = broadcast_lobby(state).await {
            tracing::debug!(error = %e, "lobby broadcast failed");
        }
    }
}

/// Destroys a table: unregisters it (recycling its id), drops any
/// pending start handshake, refreshes the lobby listing, and notifies
/// the remaining occupants. `exclude` skips the occupant whose
/// disconnect triggered the teardown.
async fn terminate_table(
    state: &Arc<ServerState>,
    id: TableId,
    exclude: Option<ClientId>,
) -> Result<(), ServerError> {
    let occupants = state.lobby.lock().await.terminate(id);
    state.pending_starts.lock().await.remove(&id);

    broadcast_lobby(state).await?;

    let bytes = state.codec.encode(&ServerEvent::Terminated)?;
    let peers = state.peers.lock().await;
    for occupant in occupants {
        if Some(occupant) == exclude {
            continue;
        }
        if let Some(tx) = peers.get(&occupant) {
            let _ = tx.send(bytes.clone());
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Broadcast helpers
// ---------------------------------------------------------------------------

/// The table the client currently occupies, if any.
async fn table_of(
    state: &Arc<ServerState>,
    client: ClientId,
) -> Option<Arc<Table>> {
    state.lobby.lock().await.table_for_client(client)
}

/// Sends one event to one client. A missing or closed peer is not an
/// error — the disconnect path owns that cleanup.
async fn send_to(
    state: &ServerState,
    client: ClientId,
    event: &ServerEvent,
) -> Result<(), ServerError> {
    let bytes = state.codec.encode(event)?;
    if let Some(tx) = state.peers.lock().await.get(&client) {
        let _ = tx.send(bytes);
    }
    Ok(())
}

/// Fans one event out to every occupant of a table. Encodes once.
async fn broadcast_table(
    state: &ServerState,
    table: &Table,
    event: &ServerEvent,
) -> Result<(), ServerError> {
    let bytes = state.codec.encode(event)?;
    let peers = state.peers.lock().await;
    for client in table.clients() {
        if let Some(tx) = peers.get(&client) {
            let _ = tx.send(bytes.clone());
        }
    }
    Ok(())
}

/// Sends the current lobby listing to every connected client.
async fn broadcast_lobby(state: &ServerState) -> Result<(), ServerError> {
    let tables = state.lobby.lock().await.summaries();
    let bytes = state.codec.encode(&ServerEvent::TableList { tables })?;
    let peers = state.peers.lock().await;
    for tx in peers.values() {
        let _ = tx.send(bytes.clone());
    }
    Ok(())
}
