//! Laying out independent graphs on a [`Dispatcher`].
//!
//! The `layout` task takes a [`LayoutInput`] and optionally [`LayoutOptions`] as positional JSON
//! arguments and returns a [`LayoutDocument`].

use crate::error::Result;
use crate::pipeline::{LayoutDocument, LayoutOptions, layout_input};
use futures::executor::block_on;
use futures::future::join_all;
use serde_json::Value;
use strata_levels::LayoutInput;
use strata_pool::{Dispatcher, TaskRegistry};

pub const LAYOUT_TASK: &str = "layout";

/// Registers the tasks provided by this crate.
pub fn register(registry: &mut TaskRegistry) -> &mut TaskRegistry {
    registry.register(LAYOUT_TASK, layout_task)
}

pub fn layout_task(args: &[Value]) -> std::result::Result<Value, String> {
    let input: LayoutInput = match args.first() {
        Some(value) => serde_json::from_value(value.clone()).map_err(|e| e.to_string())?,
        None => return Err("layout expects a graph argument".to_string()),
    };
    let options: LayoutOptions = match args.get(1) {
        Some(Value::Null) | None => LayoutOptions::default(),
        Some(value) => serde_json::from_value(value.clone()).map_err(|e| e.to_string())?,
    };
    let document = layout_input(&input, &options).map_err(|e| e.to_string())?;
    serde_json::to_value(document).map_err(|e| e.to_string())
}

/// Lays out every input on the dispatcher and returns the documents in input order.
pub fn layout_all(
    dispatcher: &Dispatcher,
    inputs: &[LayoutInput],
    options: &LayoutOptions,
) -> Result<Vec<Result<LayoutDocument>>> {
    let options = serde_json::to_value(options)?;
    let mut handles = Vec::with_capacity(inputs.len());
    for input in inputs {
        let args = vec![serde_json::to_value(input)?, options.clone()];
        handles.push(dispatcher.submit(LAYOUT_TASK, args));
    }
    tracing::debug!(graphs = handles.len(), "submitted layouts");

    Ok(block_on(join_all(handles))
        .into_iter()
        .map(|result| Ok(serde_json::from_value(result?)?))
        .collect())
}
