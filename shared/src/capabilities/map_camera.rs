use crux_core::capability::{Capability, CapabilityContext, Operation};
use serde::{Deserialize, Serialize};

use crate::model::Point;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum MapCameraOperation {
    AnimateTo { point: Point, zoom: f32 },
}

impl Operation for MapCameraOperation {
    type Output = ();
}

/// Fire-and-forget camera moves; the map widget itself lives in the shell.
pub struct MapCamera<E> {
    context: CapabilityContext<MapCameraOperation, E>,
}

impl<E> Clone for MapCamera<E> {
    fn clone(&self) -> Self {
        Self {
            context: self.context.clone(),
        }
    }
}

impl<Ev> Capability<Ev> for MapCamera<Ev> {
    type Operation = MapCameraOperation;
    type MappedSelf<MappedEv> = MapCamera<MappedEv>;

    fn map_event<F, NewEv>(&self, f: F) -> Self::MappedSelf<NewEv>
    where
        F: Fn(NewEv) -> Ev + Send + Sync + 'static,
        Ev: 'static,
        NewEv: 'static + Send,
    {
        MapCamera::new(self.context.map_event(f))
    }
}

impl<E> MapCamera<E>
where
    E: 'static,
{
    pub fn new(context: CapabilityContext<MapCameraOperation, E>) -> Self {
        Self { context }
    }

    pub fn animate_to(&self, point: Point, zoom: f32) {
        let ctx = self.context.clone();
        self.context.spawn(async move {
            ctx.notify_shell(MapCameraOperation::AnimateTo { point, zoom })
                .await;
        });
    }
}
