use proc_macro::TokenStream;
use quote::{format_ident, quote};
use syn::{Data, DeriveInput, Fields, LitStr, parse_macro_input};

#[proc_macro_derive(RedisEntity, attributes(redis))]
pub fn derive_redis_entity(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    match expand(input) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

fn expand(input: DeriveInput) -> syn::Result<proc_macro2::TokenStream> {
    let struct_name = &input.ident;
    let vis = &input.vis;
    let scan_struct_name = format_ident!("__{}Scan__", struct_name);

    // 收集 #[redis(...)] 声明，regex/example/description 保持书写顺序
    let mut key_pattern: Option<String> = None;
    let mut kind: Option<LitStr> = None;
    let mut decls: Vec<(String, String)> = Vec::new();

    for attr in &input.attrs {
        if !attr.path().is_ident("redis") {
            continue;
        }
        attr.parse_nested_meta(|meta| {
            let Some(ident) = meta.path.get_ident() else {
                return Err(meta.error("unsupported redis attribute"));
            };
            let name = ident.to_string();
            let value: LitStr = meta.value()?.parse()?;
            match name.as_str() {
                "pattern" => key_pattern = Some(value.value()),
                "kind" => kind = Some(value),
                "regex" | "example" | "description" => decls.push((name, value.value())),
                _ => return Err(meta.error("unknown redis attribute")),
            }
            Ok(())
        })?;
    }

    let Some(key_pattern) = key_pattern else {
        return Err(syn::Error::new_spanned(
            struct_name,
            "missing #[redis(pattern = \"...\")]",
        ));
    };

    let attributes = key_attributes(&key_pattern);
    for (index, attr) in attributes.iter().enumerate() {
        if !is_ident(attr) {
            return Err(syn::Error::new_spanned(
                struct_name,
                format!("key attribute `{attr}` is not a valid field name"),
            ));
        }
        if attributes[..index].contains(attr) {
            return Err(syn::Error::new_spanned(
                struct_name,
                format!("duplicate attribute in key pattern: {attr}"),
            ));
        }
    }

    // 解析结构体字段：占位符字段是属性，多出来的只允许 client
    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => fields.named.iter().collect::<Vec<_>>(),
            _ => {
                return Err(syn::Error::new_spanned(
                    struct_name,
                    "RedisEntity requires a struct with named fields",
                ));
            }
        },
        _ => {
            return Err(syn::Error::new_spanned(
                struct_name,
                "RedisEntity can only be derived for structs",
            ));
        }
    };

    let mut has_client_field = false;
    for field in &fields {
        let name = field.ident.as_ref().unwrap().to_string();
        if attributes.contains(&name) {
            continue;
        }
        if name == "client" {
            has_client_field = true;
            continue;
        }
        return Err(syn::Error::new_spanned(
            field,
            format!("field `{name}` is not a key attribute (and not `client`)"),
        ));
    }
    for attr in &attributes {
        if !fields
            .iter()
            .any(|field| field.ident.as_ref().unwrap() == attr.as_str())
        {
            return Err(syn::Error::new_spanned(
                struct_name,
                format!("missing field for key attribute `{attr}`"),
            ));
        }
    }

    // 描述符按声明顺序走 builder，乱序和坏示例在首次使用时报出来
    let builder_calls = decls.iter().map(|(decl, value)| match decl.as_str() {
        "regex" => quote! { .regex(#value).expect("invalid key regex") },
        "example" => quote! { .example(#value).expect("invalid key example") },
        _ => quote! { .description(#value) },
    });

    // from_parts：捕获值按属性序填进字段
    let from_parts_fields = fields.iter().map(|field| {
        let ident = field.ident.as_ref().unwrap();
        let name = ident.to_string();
        match attributes.iter().position(|attr| *attr == name) {
            Some(index) => quote! { #ident: values.get(#index).cloned().unwrap_or_default() },
            None => quote! { #ident: None },
        }
    });
    let values_param = if attributes.is_empty() {
        quote! { _values }
    } else {
        quote! { values }
    };

    let render_values = attributes.iter().map(|attr| {
        let ident = format_ident!("{}", attr);
        quote! { self.#ident.as_str() }
    });

    let client_override = if has_client_field {
        quote! {
            fn client_override(&self) -> Option<::redis_entity::StoreHandle> {
                self.client.clone()
            }
        }
    } else {
        quote! {}
    };

    let with_client = if has_client_field {
        quote! {
            #vis fn with_client(mut self, client: ::redis_entity::StoreHandle) -> Self {
                self.client = Some(client);
                self
            }
        }
    } else {
        quote! {}
    };

    let kind_impl = match &kind {
        Some(kind) => {
            let command_trait = match kind.value().as_str() {
                "string" => quote! { StringCommands },
                "hash" => quote! { HashCommands },
                "list" => quote! { ListCommands },
                "set" => quote! { SetCommands },
                "sorted_set" => quote! { SortedSetCommands },
                "hyper_log_log" => quote! { HyperLogLogCommands },
                "bitmap" => quote! { BitmapCommands },
                other => {
                    return Err(syn::Error::new(
                        kind.span(),
                        format!("unknown kind `{other}`"),
                    ));
                }
            };
            quote! { impl ::redis_entity::#command_trait for #struct_name {} }
        }
        None => quote! {},
    };

    let scan_filter_methods = attributes.iter().map(|attr| {
        let ident = format_ident!("{}", attr);
        quote! {
            #vis fn #ident(mut self, value: impl ::std::string::ToString) -> Self {
                self.filters.insert(#attr.to_string(), value.to_string());
                self
            }
        }
    });

    let expanded = quote! {
        impl ::redis_entity::RedisEntity for #struct_name {
            fn descriptor() -> &'static ::redis_entity::TypeDescriptor {
                static DESCRIPTOR: ::std::sync::LazyLock<::redis_entity::TypeDescriptor> =
                    ::std::sync::LazyLock::new(|| {
                        ::redis_entity::TypeDescriptor::builder(#key_pattern)
                            #(#builder_calls)*
                            .build()
                            .expect(concat!("invalid key schema for ", stringify!(#struct_name)))
                    });
                &DESCRIPTOR
            }

            fn from_parts(_key: String, #values_param: Vec<String>) -> Self {
                Self { #(#from_parts_fields),* }
            }

            fn key(&self) -> String {
                Self::descriptor().render(&[#(#render_values),*])
            }

            #client_override

            fn type_client() -> Option<::redis_entity::StoreHandle> {
                Self::__client_slot().read().unwrap().clone()
            }
        }

        impl #struct_name {
            #[doc(hidden)]
            fn __client_slot() -> &'static ::std::sync::RwLock<Option<::redis_entity::StoreHandle>> {
                static SLOT: ::std::sync::RwLock<Option<::redis_entity::StoreHandle>> =
                    ::std::sync::RwLock::new(None);
                &SLOT
            }

            /// 设置类型级默认客户端
            #vis fn use_client(client: ::redis_entity::StoreHandle) {
                *Self::__client_slot().write().unwrap() = Some(client);
            }

            /// 类型化的扫描构造器
            #vis fn scan() -> #scan_struct_name {
                #scan_struct_name {
                    filters: ::redis_entity::AttrMap::new(),
                    limit: -1,
                    client: None,
                }
            }

            #with_client
        }

        #kind_impl

        #vis struct #scan_struct_name {
            filters: ::redis_entity::AttrMap,
            limit: i64,
            client: Option<::redis_entity::StoreHandle>,
        }

        impl #scan_struct_name {
            #(#scan_filter_methods)*

            /// 交付数越过 limit 就停，负数不设上限
            #vis fn limit(mut self, limit: i64) -> Self {
                self.limit = limit;
                self
            }

            #vis fn client(mut self, client: ::redis_entity::StoreHandle) -> Self {
                self.client = Some(client);
                self
            }

            #vis fn build(
                self,
            ) -> Result<::redis_entity::Enumerator<#struct_name>, ::redis_entity::Error> {
                ::redis_entity::Enumerator::new(self.filters, self.limit, self.client)
            }

            #vis async fn count(self) -> Result<u64, ::redis_entity::Error> {
                self.build()?.count().await
            }

            #vis async fn all(self) -> Result<Vec<#struct_name>, ::redis_entity::Error> {
                self.build()?.all().await
            }

            #vis async fn flush(self) -> Result<u64, ::redis_entity::Error> {
                self.build()?.flush().await
            }
        }

        ::redis_entity::inventory::submit! {
            ::redis_entity::EntityMeta {
                type_path: concat!(module_path!(), "::", stringify!(#struct_name)),
                key_pattern: #key_pattern,
            }
        }
    };

    Ok(expanded)
}

// 和运行时的占位符扫描保持一致：{name}，名字里不允许花括号
fn key_attributes(pattern: &str) -> Vec<String> {
    let mut attrs = Vec::new();
    let bytes = pattern.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] != b'{' {
            i += 1;
            continue;
        }
        let mut j = i + 1;
        let mut restart = None;
        while j < bytes.len() {
            match bytes[j] {
                b'}' => break,
                b'{' => {
                    restart = Some(j);
                    break;
                }
                _ => j += 1,
            }
        }
        if let Some(restart) = restart {
            i = restart;
            continue;
        }
        if j < bytes.len() && j > i + 1 {
            attrs.push(pattern[i + 1..j].to_string());
            i = j + 1;
        } else {
            i += 1;
        }
    }
    attrs
}

fn is_ident(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c == '_' || c.is_ascii_alphabetic() => {}
        _ => return false,
    }
    chars.all(|c| c == '_' || c.is_ascii_alphanumeric())
}
