//! Request router
//!
//! Maps a command name and its string arguments onto store operations. Each
//! request runs in its own unit of work, so a request either commits all of
//! its mutations or none.

use log::{debug, info, warn};

use ledger_tables_core::store::OverlayScan;
use ledger_tables_core::{
    HistoryFormatter, QueryResult, StoreContext, StoreError, TableSchema, UnitOfWork,
};
use crate::clock::Clock;
use crate::config::{OutputFormat, RouterConfig};
use crate::error::{Result, RouterError};
use crate::tables::{self, INVENTORY_HISTORY, INVENTORY_LEDGER, PRICE_LIST_HISTORY};

/// Commands understood by the router
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Init,
    CreateTables,
    CreateTable,
    InvokeInventory,
    InvokePriceList,
    InsertRow,
    DeleteRow,
    Query { table: &'static str, key_columns: usize },
}

impl Command {
    fn parse(name: &str) -> Option<Self> {
        let command = match name {
            "init" => Command::Init,
            "createtables" => Command::CreateTables,
            "createtable" => Command::CreateTable,
            "invokeInventory" => Command::InvokeInventory,
            "invokePriceList" => Command::InvokePriceList,
            "insertrow" => Command::InsertRow,
            "deleterow" => Command::DeleteRow,
            "inventory_ItemOrg" => Command::Query { table: INVENTORY_HISTORY, key_columns: 2 },
            "inventory_Item" => Command::Query { table: INVENTORY_HISTORY, key_columns: 1 },
            "price_ItemOrg" => Command::Query { table: PRICE_LIST_HISTORY, key_columns: 2 },
            "price_Item" => Command::Query { table: PRICE_LIST_HISTORY, key_columns: 1 },
            "ledger_ItemOrg" => Command::Query { table: INVENTORY_LEDGER, key_columns: 2 },
            "ledger_Item" => Command::Query { table: INVENTORY_LEDGER, key_columns: 1 },
            _ => return None,
        };
        Some(command)
    }

    /// Number of arguments the command takes
    fn arity(&self) -> usize {
        match self {
            Command::Init | Command::CreateTables | Command::CreateTable => 0,
            Command::InvokeInventory | Command::InvokePriceList => 3,
            Command::InsertRow => 5,
            Command::DeleteRow => 4,
            Command::Query { key_columns, .. } => *key_columns,
        }
    }
}

/// Outcome of a routed request
#[derive(Debug)]
pub enum Response {
    /// The request succeeded and produced no output
    Ack,

    /// Rows matched by a history query, in key order
    History {
        /// Schema of the queried table
        schema: TableSchema,
        /// Matching rows
        rows: OverlayScan,
    },
}

impl Response {
    /// Render the response for printing
    ///
    /// Returns `None` for acknowledgements.
    pub fn render(self, output: OutputFormat, label: &str) -> Result<Option<String>> {
        match self {
            Response::Ack => Ok(None),
            Response::History { schema, rows } => match output {
                OutputFormat::Text => Ok(Some(HistoryFormatter::new(label).format(rows, &schema))),
                OutputFormat::Json => {
                    let result = QueryResult::from_rows(&schema, rows);
                    Ok(Some(serde_json::to_string(&result)?))
                }
            },
        }
    }
}

/// Routes named commands to a store
pub struct Router {
    store: StoreContext,
    clock: Box<dyn Clock>,
    config: RouterConfig,
}

impl std::fmt::Debug for Router {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Router")
            .field("store", &self.store)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Router {
    /// Create a router over a fresh store built from `config.store`
    pub fn new(config: RouterConfig, clock: impl Clock + 'static) -> Result<Self> {
        config.validate()?;
        let store = StoreContext::new(config.store.clone())?;
        Self::with_store(store, config, clock)
    }

    /// Create a router over an existing store
    ///
    /// The configuration is validated here, so `timestamp` never sees an
    /// unparseable pattern.
    pub fn with_store(
        store: StoreContext,
        config: RouterConfig,
        clock: impl Clock + 'static,
    ) -> Result<Self> {
        config.validate()?;
        Ok(Router {
            store,
            clock: Box::new(clock),
            config,
        })
    }

    /// Get the store
    pub fn store(&self) -> &StoreContext {
        &self.store
    }

    /// Get the configuration
    pub fn config(&self) -> &RouterConfig {
        &self.config
    }

    /// Define every router table that does not exist yet
    pub fn bootstrap(&self) -> Result<()> {
        let mut missing = Vec::new();
        for schema in [
            tables::inventory_history(),
            tables::price_list_history(),
            tables::inventory_ledger(),
        ] {
            if self.store.table(&schema.name)?.is_none() {
                missing.push(schema);
            }
        }

        if !missing.is_empty() {
            info!("Bootstrapping {} tables", missing.len());
            self.store.define_tables(missing)?;
        }
        Ok(())
    }

    /// Current time in the configured timestamp format
    pub fn timestamp(&self) -> String {
        self.clock.now().format(&self.config.timestamp_format).to_string()
    }

    /// Run one command
    pub fn dispatch<S: AsRef<str>>(&self, command: &str, args: &[S]) -> Result<Response> {
        let parsed = Command::parse(command)
            .ok_or_else(|| RouterError::UnknownCommand(command.to_string()))?;

        if args.len() != parsed.arity() {
            warn!("Rejected {}: expected {} arguments, got {}", command, parsed.arity(), args.len());
            return Err(RouterError::ArgumentCount {
                command: command.to_string(),
                expected: parsed.arity(),
                actual: args.len(),
            });
        }

        let args: Vec<&str> = args.iter().map(AsRef::as_ref).collect();
        debug!("Dispatching {} {:?}", command, args);

        let mut unit = self.store.begin();
        let result = self.apply(parsed, &args, &mut unit);
        match result {
            Ok(response) => {
                unit.commit()?;
                Ok(response)
            }
            Err(e) => {
                warn!("Rejected {}: {}", command, e);
                unit.rollback();
                Err(e)
            }
        }
    }

    /// Render a response with the configured output format and label
    pub fn render(&self, response: Response) -> Result<Option<String>> {
        response.render(self.config.output, &self.config.history_label)
    }

    fn apply(&self, command: Command, args: &[&str], unit: &mut UnitOfWork<'_>) -> Result<Response> {
        match command {
            Command::Init => {}
            Command::CreateTables => {
                self.store
                    .define_tables(vec![tables::inventory_history(), tables::price_list_history()])?;
            }
            Command::CreateTable => {
                self.store.define_table(tables::inventory_ledger())?;
            }
            Command::InvokeInventory => self.record(unit, INVENTORY_HISTORY, args)?,
            Command::InvokePriceList => self.record(unit, PRICE_LIST_HISTORY, args)?,
            Command::InsertRow => {
                unit.insert_raw(INVENTORY_LEDGER, args)?;
            }
            Command::DeleteRow => {
                unit.delete_raw(INVENTORY_LEDGER, args)?;
            }
            Command::Query { table, .. } => {
                let schema = self
                    .store
                    .table(table)?
                    .ok_or_else(|| StoreError::UnknownTable(table.to_string()))?;
                let prefix = schema.parse_key(args)?;
                let rows = unit.query(table, &prefix)?;
                return Ok(Response::History { schema, rows });
            }
        }
        Ok(Response::Ack)
    }

    /// Insert `item, org, value` stamped with the current time
    fn record(&self, unit: &mut UnitOfWork<'_>, table: &str, args: &[&str]) -> Result<()> {
        let timestamp = self.timestamp();
        unit.insert_raw(table, &[args[0], args[1], &timestamp, args[2]])?;
        Ok(())
    }
}
