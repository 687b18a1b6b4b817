slotmap::new_key_type! {
    /// Unique identifier for a lateral profile in the network store.
    pub struct ProfileId;
}
