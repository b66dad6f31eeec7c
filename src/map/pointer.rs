// Copyright 2025 Chris Custine
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use walkers::{MapMemory, Plugin, Projector};

/// Pointer state in geographic coordinates, `(lat, lon)`, for one frame
#[derive(Debug, Default, Clone, Copy)]
pub struct PointerEvents {
    pub hover: Option<(f64, f64)>,
    pub click: Option<(f64, f64)>,
    pub map_rect: Option<egui::Rect>,
}

/// Plugin that unprojects hover and click positions
pub struct PointerPlugin<'a> {
    events: &'a mut PointerEvents,
}

impl<'a> PointerPlugin<'a> {
    pub fn new(events: &'a mut PointerEvents) -> Self {
        Self { events }
    }
}

impl Plugin for PointerPlugin<'_> {
    fn run(
        self: Box<Self>,
        _ui: &mut egui::Ui,
        response: &egui::Response,
        projector: &Projector,
        _memory: &MapMemory,
    ) {
        let unproject = |pos: egui::Pos2| {
            let position = projector.unproject(pos.to_vec2());
            (position.y(), position.x())
        };

        self.events.map_rect = Some(response.rect);
        self.events.hover = response.hover_pos().map(unproject);
        self.events.click = if response.clicked() {
            response.interact_pointer_pos().map(unproject)
        } else {
            None
        };
    }
}
