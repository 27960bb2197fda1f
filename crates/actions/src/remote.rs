//! Fixed mapping from action names to the remote calls that perform them.

use triage_core::ActionKind;

/// Backend service an identifier-style action is sent to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Service {
    Order,
    Customer,
    Asset,
}

/// One remote operation, independent of base URLs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoteCall {
    /// `POST {service}/{path}` with `{"<id_field>": <query>}`.
    Identifier {
        service: Service,
        path: &'static str,
        id_field: &'static str,
    },
    /// `POST {NINJA_URL}/invoices` with the extracted payload.
    Invoice,
}

pub const RETRY_ORDER: RemoteCall = RemoteCall::Identifier {
    service: Service::Order,
    path: "/retry-order",
    id_field: "order_id",
};

pub const SYNC_CUSTOMER: RemoteCall = RemoteCall::Identifier {
    service: Service::Customer,
    path: "/sync-customer-data",
    id_field: "customer_id",
};

pub const FIX_ASSET: RemoteCall = RemoteCall::Identifier {
    service: Service::Asset,
    path: "/fix-asset",
    id_field: "asset_id",
};

/// `None` means the action has no remote implementation.
pub fn remote_call(kind: ActionKind) -> Option<RemoteCall> {
    match kind {
        ActionKind::UpdateOrder | ActionKind::RetryOrder => Some(RETRY_ORDER),
        ActionKind::SyncCustomerData => Some(SYNC_CUSTOMER),
        ActionKind::FixAssetMismatch => Some(FIX_ASSET),
        ActionKind::CreateInvoice | ActionKind::UpdateInvoice => Some(RemoteCall::Invoice),
        ActionKind::CreateOrder | ActionKind::RestartServer => None,
    }
}
