//! The lobby: creates, lists, recycles, and destroys tables.
//!
//! One owned instance per process with an explicit lifecycle — created
//! at server start, funneled through its methods, torn down with the
//! server. The lobby never reaches into a table's game state; it only
//! tracks which tables exist and which client sits at which table.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use tilehall_protocol::{TableId, TableSummary};
use tilehall_transport::ClientId;

use crate::table::Table;

/// Process-wide registry of live tables.
#[derive(Default)]
pub struct Lobby {
    /// Live tables in creation order (the listing order).
    tables: Vec<Arc<Table>>,
    /// Id → table lookup.
    by_id: HashMap<TableId, Arc<Table>>,
    /// Which table each client has joined. A client is in at most one
    /// table at a time.
    client_index: HashMap<ClientId, TableId>,
    /// Ids freed by terminated tables; the smallest is reused first.
    recycled: BTreeSet<u32>,
    /// Next never-used id.
    next_id: u32,
}

impl Lobby {
    /// Creates an empty lobby.
    pub fn new() -> Self {
        Self::default()
    }

    /// Opens a new table, unless the most recently created table is
    /// still empty — one open-and-empty table at the tail of the list
    /// is enough, and this check is what stops unbounded empty-room
    /// accumulation.
    ///
    /// Returns `None` ("not created") when refused.
    pub fn create_table(&mut self) -> Option<TableId> {
        if let Some(last) = self.tables.last() {
            if last.is_empty() {
                return None;
            }
        }

        let id = TableId(match self.recycled.pop_first() {
            Some(recycled) => recycled,
            None => {
                let fresh = self.next_id;
                self.next_id += 1;
                fresh
            }
        });

        let table = Arc::new(Table::new(id));
        self.tables.push(Arc::clone(&table));
        self.by_id.insert(id, table);
        tracing::info!(table = %id, "table created");
        Some(id)
    }

    /// Looks up a table by id.
    pub fn table(&self, id: TableId) -> Option<Arc<Table>> {
        self.by_id.get(&id).cloned()
    }

    /// The table a client has joined, if any.
    pub fn table_for_client(&self, client: ClientId) -> Option<Arc<Table>> {
        let id = self.client_index.get(&client)?;
        self.by_id.get(id).cloned()
    }

    /// Records that a client has joined a table. Call after a
    /// successful [`Table::join`].
    pub fn bind_client(&mut self, client: ClientId, id: TableId) {
        self.client_index.insert(client, id);
    }

    /// Drops a client's table binding (seat release or disconnect).
    pub fn unbind_client(&mut self, client: ClientId) {
        self.client_index.remove(&client);
    }

    /// The lobby listing, in table-creation order.
    pub fn summaries(&self) -> Vec<TableSummary> {
        self.tables.iter().map(|t| t.summary()).collect()
    }

    /// Destroys a table: removes it from the listing and the id map,
    /// returns its id to the recycle pool, and strips every occupant's
    /// binding. Returns the occupants so the caller can notify them.
    /// Idempotent — an unknown id is a no-op.
    pub fn terminate(&mut self, id: TableId) -> Vec<ClientId> {
        let Some(table) = self.by_id.remove(&id) else {
            return Vec::new();
        };
        self.tables.retain(|t| t.id() != id);
        self.recycled.insert(id.0);

        let occupants = table.clients();
        for client in &occupants {
            self.client_index.remove(client);
        }

        tracing::info!(
            table = %id,
            occupants = occupants.len(),
            "table terminated"
        );
        occupants
    }

    /// Number of live tables.
    pub fn len(&self) -> usize {
        self.tables.len()
    }

    /// Returns `true` if no tables are live.
    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}

// =========================================================================
// Tests
// =========================================================================
