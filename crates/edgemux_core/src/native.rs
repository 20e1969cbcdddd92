//! Boundary to the native simulator's callback API.
//!
//! The simulator owns signals and value-change subscriptions. The
//! multiplexer registers one subscription per batch, passing the batch's
//! [`RegistrationKey`] as user data, and the host routes every resulting
//! notification back as a [`ValueChange`] to
//! [`EdgeMux::on_value_change`](crate::EdgeMux::on_value_change).

use std::fmt::Debug;
use std::hash::Hash;

use edgemux_common::{EdgeValue, Logic};

use crate::registration::RegistrationKey;

/// The value-change callback primitives of a simulator kernel.
pub trait NativeSimulator {
    /// Opaque reference to a simulator signal, compared by identity.
    type Signal: Copy + Eq + Hash + Debug;

    /// Handle of one registered native callback.
    type CallbackHandle: Copy + Debug;

    /// Subscribes to value changes of `signal`.
    ///
    /// `condition` is advisory: the simulator may notify on every change and
    /// leave the comparison to the multiplexer.
    fn register_value_change_callback(
        &mut self,
        signal: Self::Signal,
        condition: EdgeValue,
        user_data: RegistrationKey,
    ) -> Self::CallbackHandle;

    /// Removes a subscription. Each handle is removed at most once.
    fn remove_callback(&mut self, handle: Self::CallbackHandle);
}

/// Payload of one native value-change notification.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ValueChange {
    /// The user data supplied at registration time.
    pub user_data: RegistrationKey,
    /// The signal's new value.
    pub value: Logic,
}

impl ValueChange {
    /// Creates a notification payload.
    pub fn new(user_data: RegistrationKey, value: Logic) -> Self {
        Self { user_data, value }
    }
}
