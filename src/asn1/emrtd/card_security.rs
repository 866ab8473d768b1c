use {
    crate::{
        asn1::oid::{ID_SECURITY_OBJECT, ID_SIGNED_DATA},
        SecurityInfos,
    },
    anyhow::{anyhow, ensure, Result},
    cms::{content_info::ContentInfo, signed_data::SignedData},
    der::{asn1::OctetString, Decode},
    tracing::debug,
};

/// EF.CardSecurity, SecurityInfos signed by the document signer.
///
/// The file is a CMS `ContentInfo` holding `SignedData` with content type
/// id-SecurityObject. The signature is not verified here.
///
/// See BSI TR-03110-3 appendix A.1.2
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EfCardSecurity {
    pub raw:            Vec<u8>,
    pub signed_data:    SignedData,
    pub security_infos: SecurityInfos,
}

impl EfCardSecurity {
    pub fn from_bytes(data: &[u8]) -> Result<Option<Self>> {
        if data.is_empty() {
            return Ok(None);
        }
        debug!(bytes = %hex::encode(data), "Parsing EF.CardSecurity");
        let content_info = ContentInfo::from_der(data).map_err(|e| anyhow!(e))?;
        ensure!(
            content_info.content_type == ID_SIGNED_DATA,
            "Expected SignedData (content type: {})",
            content_info.content_type
        );
        let signed_data = content_info
            .content
            .decode_as::<SignedData>()
            .map_err(|e| anyhow!(e))?;

        let econ = &signed_data.encap_content_info;
        ensure!(
            econ.econtent_type == ID_SECURITY_OBJECT,
            "Incorrect eContentType (got: {})",
            econ.econtent_type
        );
        let octet_string = econ
            .econtent
            .as_ref()
            .ok_or_else(|| anyhow!("SignedData has no eContent"))?
            .decode_as::<OctetString>()
            .map_err(|e| anyhow!(e))?;
        let security_infos = SecurityInfos::from_der_bytes(octet_string.as_bytes())?;

        Ok(Some(Self {
            raw: data.to_vec(),
            signed_data,
            security_infos,
        }))
    }
}
