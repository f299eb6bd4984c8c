use crux_core::capability::{Capability, CapabilityContext, Operation};
use serde::{Deserialize, Serialize};

use crate::error::LocationError;
use crate::model::Point;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "op")]
pub enum LocationOperation {
    /// Show the platform's fine/coarse location prompt.
    RequestPermission,
    /// Best last known fix. Fails with `PermissionDenied` if the grant was
    /// revoked since it was last checked, `Unavailable` if there is no fix yet.
    LastKnownPosition,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "data")]
pub enum LocationOutput {
    Permission { granted: bool },
    Position(Point),
}

pub type LocationResult = Result<LocationOutput, LocationError>;

impl Operation for LocationOperation {
    type Output = LocationResult;
}

pub struct Location<E> {
    context: CapabilityContext<LocationOperation, E>,
}

impl<E> Clone for Location<E> {
    fn clone(&self) -> Self {
        Self {
            context: self.context.clone(),
        }
    }
}

impl<Ev> Capability<Ev> for Location<Ev> {
    type Operation = LocationOperation;
    type MappedSelf<MappedEv> = Location<MappedEv>;

    fn map_event<F, NewEv>(&self, f: F) -> Self::MappedSelf<NewEv>
    where
        F: Fn(NewEv) -> Ev + Send + Sync + 'static,
        Ev: 'static,
        NewEv: 'static + Send,
    {
        Location::new(self.context.map_event(f))
    }
}

impl<E> Location<E>
where
    E: 'static,
{
    pub fn new(context: CapabilityContext<LocationOperation, E>) -> Self {
        Self { context }
    }

    /// One call, no retry. The shell owns any timeout.
    pub fn last_known_position<F>(&self, callback: F)
    where
        F: FnOnce(Result<Point, LocationError>) -> E + Send + 'static,
    {
        let ctx = self.context.clone();
        self.context.spawn(async move {
            let output = ctx
                .request_from_shell(LocationOperation::LastKnownPosition)
                .await;
            ctx.update_app(callback(fix_from_output(output)));
        });
    }

    /// A prompt that fails or answers with anything but a grant counts as denied.
    pub fn request_permission<F>(&self, callback: F)
    where
        F: FnOnce(bool) -> E + Send + 'static,
    {
        let ctx = self.context.clone();
        self.context.spawn(async move {
            let output = ctx
                .request_from_shell(LocationOperation::RequestPermission)
                .await;
            let granted = matches!(output, Ok(LocationOutput::Permission { granted: true }));
            ctx.update_app(callback(granted));
        });
    }
}

/// The shell's fix is re-validated; it crosses the boundary as plain numbers.
fn fix_from_output(output: LocationResult) -> Result<Point, LocationError> {
    match output? {
        LocationOutput::Position(point) => Point::new(point.lat, point.lon)
            .map_err(|e| LocationError::Other(format!("invalid location fix: {e}"))),
        other => Err(LocationError::Other(format!(
            "unexpected location output: {other:?}"
        ))),
    }
}
