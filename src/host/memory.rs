use crate::host::client::{HostClient, MemoryPolicy, PriorityCutoff};
use crate::host::host::LayerTreeHost;

impl<C: HostClient> LayerTreeHost<C> {
    /// Whether the output is on screen.
    pub fn visible(&self) -> bool {
        self.visible
    }

    /// Show or hide the output. Hidden hosts keep no producer textures;
    /// becoming visible requires high-resolution content for the next frame.
    pub fn set_visible(&mut self, visible: bool) {
        if self.visible == visible {
            return;
        }
        self.visible = visible;
        tracing::debug!(visible, "visibility changed");
        self.enforce_memory_policy();
        if visible {
            self.active_tree.set_requires_high_res_to_draw();
            self.client.set_needs_redraw(None);
        }
    }

    /// Policy handed down by the embedder.
    pub fn memory_policy(&self) -> MemoryPolicy {
        self.memory_policy
    }

    /// Budget actually in force: nothing at all while hidden.
    pub fn actual_memory_policy(&self) -> MemoryPolicy {
        if self.visible {
            self.memory_policy
        } else {
            MemoryPolicy {
                bytes_limit_when_visible: 0,
                priority_cutoff_when_visible: PriorityCutoff::AllowNothing,
            }
        }
    }

    /// Memory the producer last said it needs to draw everything.
    pub fn set_max_memory_needed_bytes(&mut self, bytes: usize) {
        self.max_memory_needed_bytes = bytes;
    }

    /// Apply a new memory policy.
    ///
    /// A commit is requested unless both the old and the new budget already
    /// cover everything the producer needs at the same cutoff.
    #[tracing::instrument(skip(self))]
    pub fn set_memory_policy(&mut self, policy: MemoryPolicy) {
        if policy == self.memory_policy {
            return;
        }
        let old = self.actual_memory_policy();
        self.memory_policy = policy;
        let new = self.actual_memory_policy();
        if old == new {
            return;
        }
        self.enforce_memory_policy();

        let needed = self.max_memory_needed_bytes;
        let enough = self.visible
            && new.bytes_limit_when_visible >= needed
            && old.bytes_limit_when_visible >= needed
            && new.priority_cutoff_when_visible == old.priority_cutoff_when_visible;
        if !enough {
            self.client.set_needs_commit();
        }
    }

    fn enforce_memory_policy(&mut self) {
        let policy = self.actual_memory_policy();
        let evicted = self.client.reduce_contents_texture_memory(
            policy.bytes_limit_when_visible,
            policy.priority_cutoff_when_visible,
        );
        if !evicted {
            return;
        }
        tracing::debug!(limit = policy.bytes_limit_when_visible, "contents textures evicted");
        self.active_tree.set_contents_textures_purged();
        if let Some(pending) = self.pending_tree.as_mut() {
            pending.set_contents_textures_purged();
        }
        self.client.set_needs_commit();
        self.notify_can_draw_state_changed();
    }

    /// The producer re-uploaded its textures after an eviction.
    pub fn reset_contents_textures_purged(&mut self) {
        self.active_tree.reset_contents_textures_purged();
        if let Some(pending) = self.pending_tree.as_mut() {
            pending.reset_contents_textures_purged();
        }
        self.notify_can_draw_state_changed();
    }
}

#[cfg(test)]
#[path = "../../tests/unit/host/memory.rs"]
mod tests;
